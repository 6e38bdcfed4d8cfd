//! Watchdog for generation calls.
//!
//! The core waits on the port for as long as it takes; a hung request would
//! leave the page loading forever. This wrapper races the call against a
//! browser timer and reports `Timeout` when the timer wins. The losing
//! request is dropped, not aborted.

use std::rc::Rc;

use async_trait::async_trait;
use futures::future::{self, Either};
use gloo_timers::future::TimeoutFuture;

use persona_core::ports::{GenerationPort, GenerationRequest, GenerationResponse};
use persona_types::{PersonaError, Result};

pub struct WithTimeout {
    inner: Rc<dyn GenerationPort>,
    timeout_ms: u32,
}

impl WithTimeout {
    pub fn new(inner: Rc<dyn GenerationPort>, timeout_ms: u32) -> Self {
        Self { inner, timeout_ms }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}

#[async_trait(?Send)]
impl GenerationPort for WithTimeout {
    async fn generate_content(&self, req: GenerationRequest) -> Result<GenerationResponse> {
        let call = self.inner.generate_content(req);
        let timer = Box::pin(TimeoutFuture::new(self.timeout_ms));

        match future::select(call, timer).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => {
                log::warn!(
                    "{} did not answer within {}ms",
                    self.inner.provider_name(),
                    self.timeout_ms
                );
                Err(PersonaError::Timeout(u64::from(self.timeout_ms)))
            }
        }
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}
