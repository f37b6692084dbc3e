//! Terminal spinner that mirrors a [`LoadingFlag`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinHandle;

use crate::http::LoadingFlag;

type Slot = Arc<Mutex<Option<ProgressBar>>>;

/// Shows a spinner while the flag is raised and clears it when lowered.
pub struct LoadingSpinner {
    task: JoinHandle<()>,
    current: Slot,
}

impl LoadingSpinner {
    /// Start following `flag`. With `enabled == false` nothing is drawn.
    pub fn follow(flag: &LoadingFlag, message: impl Into<String>, enabled: bool) -> Self {
        let mut rx = flag.subscribe();
        let message = message.into();
        let current: Slot = Arc::new(Mutex::new(None));
        let slot = current.clone();

        let task = tokio::spawn(async move {
            loop {
                let loading = *rx.borrow_and_update();
                {
                    let mut bar = slot.lock().unwrap_or_else(PoisonError::into_inner);
                    if loading && enabled && bar.is_none() {
                        *bar = Some(spinner(&message));
                    } else if !loading && let Some(done) = bar.take() {
                        done.finish_and_clear();
                    }
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });

        Self { task, current }
    }

    pub fn is_spinning(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stop following and clear any visible spinner.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for LoadingSpinner {
    fn drop(&mut self) {
        self.task.abort();
        if let Some(bar) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            bar.finish_and_clear();
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
