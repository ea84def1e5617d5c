use super::{CursorPaging, Mode, ProtocolState, QueryRequest};
use crate::{Config, CursorToken, PageContinuation};

use quarry_core::{
    request::TrackTotalHits, Error, IndexTarget, PlanSerializer, RequestDescriptor, Result,
    SortValue,
};

use std::{sync::Arc, time::Duration};

/// Builds a [`QueryRequest`].
///
/// Requests are single-shot unless [`cursor`](Self::cursor) is called.
/// Every invalid combination is reported by [`build`](Self::build); nothing
/// is validated later while paging.
#[derive(Default)]
pub struct Builder {
    config: Config,

    indices: Option<IndexTarget>,

    descriptor: Option<RequestDescriptor>,

    /// Overrides the descriptor's size
    size: Option<i64>,

    track_total_hits_all: Option<bool>,

    includes: Vec<String>,

    plan: Option<Arc<dyn PlanSerializer>>,

    cursor: Option<CursorOptions>,

    resume: Option<Resume>,
}

struct CursorOptions {
    keep_alive: Option<Duration>,
}

/// A cursor opened elsewhere, optionally with a position to resume from.
struct Resume {
    handle: String,
    last_sort_values: Option<Vec<SortValue>>,
}

impl Builder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn index(&mut self, indices: IndexTarget) -> &mut Self {
        self.indices = Some(indices);
        self
    }

    /// Starts from an existing request body instead of an empty one.
    pub fn descriptor(&mut self, descriptor: RequestDescriptor) -> &mut Self {
        self.descriptor = Some(descriptor);
        self
    }

    pub fn size(&mut self, size: i64) -> &mut Self {
        self.size = Some(size);
        self
    }

    /// Overrides [`Config::track_total_hits_all`] for this request.
    pub fn track_total_hits_all(&mut self, track_all: bool) -> &mut Self {
        self.track_total_hits_all = Some(track_all);
        self
    }

    pub fn includes<I, S>(&mut self, includes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes = includes.into_iter().map(Into::into).collect();
        self
    }

    pub fn plan(&mut self, plan: impl PlanSerializer + 'static) -> &mut Self {
        self.plan = Some(Arc::new(plan));
        self
    }

    pub fn shared_plan(&mut self, plan: Arc<dyn PlanSerializer>) -> &mut Self {
        self.plan = Some(plan);
        self
    }

    /// Page through a server-side cursor kept alive for `keep_alive`
    /// between calls.
    pub fn cursor(&mut self, keep_alive: Duration) -> &mut Self {
        self.cursor = Some(CursorOptions {
            keep_alive: Some(keep_alive),
        });
        self
    }

    /// Like [`cursor`](Self::cursor), using [`Config::cursor_keep_alive`].
    pub fn cursor_with_default_keep_alive(&mut self) -> &mut Self {
        self.cursor = Some(CursorOptions { keep_alive: None });
        self
    }

    /// Continue a cursor that was opened elsewhere.
    ///
    /// With `last_sort_values` the first fetch resumes after that sort key;
    /// without, it reads the cursor from the start.
    pub fn resume(
        &mut self,
        handle: impl Into<String>,
        last_sort_values: Option<Vec<SortValue>>,
    ) -> &mut Self {
        self.resume = Some(Resume {
            handle: handle.into(),
            last_sort_values,
        });
        self
    }

    pub fn build(&self) -> Result<QueryRequest> {
        let Some(indices) = self.indices.clone() else {
            return Err(Error::invalid_request("index target is required"));
        };

        let Some(plan) = self.plan.clone() else {
            return Err(Error::invalid_request("plan serializer is required"));
        };

        let mut descriptor = self.descriptor.clone().unwrap_or_default();

        let size = self
            .size
            .or(descriptor.size)
            .unwrap_or(self.config.page_size);
        if size < 0 {
            return Err(Error::invalid_request(format!(
                "page size must not be negative; size={size}"
            )));
        }
        descriptor.size = Some(size);

        let track_all = self
            .track_total_hits_all
            .unwrap_or(self.config.track_total_hits_all);
        if track_all {
            descriptor.track_total_hits = TrackTotalHits::All;
        }

        let mode = match &self.cursor {
            None => {
                if self.resume.is_some() {
                    return Err(Error::invalid_request(
                        "resuming a cursor requires cursor mode",
                    ));
                }

                descriptor.timeout.get_or_insert(self.config.query_timeout);
                Mode::SingleShot { done: false }
            }
            Some(options) => {
                let keep_alive = options.keep_alive.unwrap_or(self.config.cursor_keep_alive);
                if keep_alive.is_zero() {
                    return Err(Error::invalid_request("cursor keep-alive must be non-zero"));
                }
                let keep_alive = round_up_to_millis(keep_alive)?;

                Mode::Cursor(self.cursor_paging(keep_alive)?)
            }
        };

        Ok(QueryRequest {
            indices,
            descriptor,
            includes: self.includes.clone(),
            plan,
            mode,
        })
    }

    fn cursor_paging(&self, keep_alive: Duration) -> Result<CursorPaging> {
        let tiebreak_fields = checked_tiebreak_fields(&self.config)?;

        let Some(resume) = &self.resume else {
            return Ok(CursorPaging {
                keep_alive,
                token: None,
                continuation: PageContinuation::new(tiebreak_fields),
                state: ProtocolState::Fresh,
            });
        };

        if resume.handle.is_empty() {
            return Err(Error::invalid_request("cursor handle is empty"));
        }

        let token = Some(CursorToken::new(resume.handle.clone(), keep_alive));

        Ok(match &resume.last_sort_values {
            Some(values) => CursorPaging {
                keep_alive,
                token,
                continuation: PageContinuation::resume(tiebreak_fields, values.clone()),
                state: ProtocolState::Paging,
            },
            None => CursorPaging {
                keep_alive,
                token,
                continuation: PageContinuation::new(tiebreak_fields),
                state: ProtocolState::Fresh,
            },
        })
    }
}

pub(super) fn checked_tiebreak_fields(config: &Config) -> Result<[String; 2]> {
    if let Some(position) = config
        .tiebreak_fields
        .iter()
        .position(|field| field.trim().is_empty())
    {
        return Err(Error::invalid_request(format!(
            "tiebreak field {position} is blank"
        )));
    }

    Ok(config.tiebreak_fields.clone())
}

/// Keep-alives travel as whole milliseconds.
fn round_up_to_millis(keep_alive: Duration) -> Result<Duration> {
    let millis = keep_alive.as_millis() + u128::from(keep_alive.subsec_nanos() % 1_000_000 != 0);

    u64::try_from(millis)
        .map(Duration::from_millis)
        .map_err(|_| {
            Error::invalid_request(format!(
                "cursor keep-alive is too long; keep_alive={keep_alive:?}"
            ))
        })
}
