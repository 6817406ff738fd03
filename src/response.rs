//! Composition of provider outcomes into the caller-facing response

use crate::error::DomainError;
use crate::request::{ProviderOutcome, UnifiedResponse};
use crate::synthesis::{synthesize, SynthesisPolicy};

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseNormalizer
{   policy: SynthesisPolicy
}

impl ResponseNormalizer
{   pub fn new(policy: SynthesisPolicy) -> Self
    {   ResponseNormalizer { policy }
    }

    /// Wrap the outcome set into a `UnifiedResponse`.
    ///
    /// A lone provider's failure is returned as its error. With several
    /// providers the result is always a synthesized success, even when
    /// every provider failed.
    pub fn compose(
      &self
    , mut outcomes: Vec<ProviderOutcome>
    , policy: Option<SynthesisPolicy>
    ) -> Result<UnifiedResponse, DomainError>
    {   if outcomes.len() > 1
        {   let text = synthesize(&outcomes, policy.unwrap_or(self.policy));
            return Ok(UnifiedResponse::from_text(text));
        }

        let outcome = outcomes
          .pop()
          .ok_or_else(|| DomainError::invalid_request("No providers requested"))?;
        match (outcome.text, outcome.error)
        {   (_, Some(error)) => Err(error)
          , (Some(text), None) => Ok(UnifiedResponse::from_text(text))
          , (None, None) => Err(DomainError::upstream(
              format!("{} returned no content", outcome.label),
              ""
            ))
        }
    }
}
