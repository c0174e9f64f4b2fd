use crate::error::FeedError;
use crate::services::http::SubmitRequest;
use crate::ui::{AppState, ToastLevel};

pub enum AppMsg {
    SubmitDone {
        feed: String,
        outcome: Result<String, FeedError>,
    },
    SelectFeed(usize),
    ReloadFeed,
    CopyResult,
}

pub enum Effect {
    Submit {
        feed: String,
        request: SubmitRequest,
    },
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
    CopyToClipboard {
        text: String,
    },
}

fn toast(text: impl Into<String>, level: ToastLevel) -> Effect {
    Effect::ShowToast {
        text: text.into(),
        level,
        seconds: 3,
    }
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        SubmitDone { feed, outcome } => {
            let Some(target) = state.feeds.iter_mut().find(|f| f.name() == feed) else {
                let err = FeedError::UnknownFeed(feed);
                tracing::warn!(error = %err, "dropping submit result");
                effects.push(toast(err.to_string(), ToastLevel::Error));
                return effects;
            };
            match outcome {
                Ok(body) => {
                    target.on_load(&body);
                    effects.push(toast(format!("{feed}: response received"), ToastLevel::Success));
                }
                Err(e) => {
                    target.on_error(&e);
                    effects.push(toast(format!("{feed}: {e}"), ToastLevel::Error));
                }
            }
        }
        SelectFeed(idx) => {
            if idx < state.feeds.len() {
                state.selected = idx;
            }
        }
        ReloadFeed => {
            if let Some(feed) = state.feeds.get_mut(state.selected) {
                feed.load();
                tracing::debug!(feed = %feed.name(), "feed reloaded");
                effects.push(toast(format!("{}: reloaded", feed.name()), ToastLevel::Info));
            }
        }
        CopyResult => {
            match state
                .feeds
                .get(state.selected)
                .and_then(|f| f.last_result())
            {
                Some(text) => effects.push(Effect::CopyToClipboard {
                    text: text.to_string(),
                }),
                None => effects.push(toast("Nothing to copy", ToastLevel::Info)),
            }
        }
    }
    effects
}
