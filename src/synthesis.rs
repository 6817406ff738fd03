//! Structural merging of several providers' answers into one text

use serde::{Deserialize, Serialize};
use log::debug;

use crate::request::ProviderOutcome;

/// Preamble of the extractive-points policy
pub const POINTS_PREAMBLE: &str
  = "Here are the key points gathered from multiple AI providers:";

/// Lines taken from each provider by the extractive-points policy
const POINTS_PER_PROVIDER: usize = 3;

/// How multi-provider answers are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisPolicy
{   /// Each answer under a heading naming its provider, caller order
    #[default]
    #[serde(alias = "concat", alias = "concatenation")]
    Labeled
  , /// Longest answer first, the rest as "Additional insights"
    #[serde(alias = "longest-first", alias = "longest_first")]
    Longest
  , /// First lines of every answer, interleaved as bullets
    #[serde(alias = "bullets", alias = "extractive")]
    Points
}

/// Text standing in for a provider that did not answer
pub fn unavailable_marker(label: &str) -> String
{   format!("[{} response unavailable]", label)
}

/// Merge `outcomes` under `policy`.
///
/// Every outcome is represented: failed ones contribute their
/// unavailability marker. Answer text is never rewritten.
pub fn synthesize(outcomes: &[ProviderOutcome], policy: SynthesisPolicy)
  -> String
{   debug!(
      "Synthesizing {} outcomes with {:?} policy",
      outcomes.len(),
      policy
    );
    match policy
    {   SynthesisPolicy::Labeled => labeled(outcomes)
      , SynthesisPolicy::Longest => longest_first(outcomes)
      , SynthesisPolicy::Points => points(outcomes)
    }
}

fn body_of(outcome: &ProviderOutcome) -> String
{   match (&outcome.text, outcome.is_ok())
    {   (Some(text), true) => text.clone()
      , _ => unavailable_marker(&outcome.label)
    }
}

fn labeled(outcomes: &[ProviderOutcome]) -> String
{   outcomes
      .iter()
      .map(|o| format!("**{}:**\n{}", o.label, body_of(o)))
      .collect::<Vec<_>>()
      .join("\n\n")
}

fn longest_first(outcomes: &[ProviderOutcome]) -> String
{   let mut answered: Vec<(&str, &str)> = outcomes
      .iter()
      .filter(|o| o.is_ok())
      .filter_map(|o| o.text.as_deref().map(|t| (o.label.as_str(), t)))
      .collect();
    // stable: equal lengths keep caller order
    answered.sort_by(|a, b| b.1.chars().count().cmp(&a.1.chars().count()));

    let mut sections = Vec::with_capacity(outcomes.len());
    let mut rest = answered.into_iter();
    if let Some((_, text)) = rest.next()
    {   sections.push(text.to_string());
    }
    for (label, text) in rest
    {   sections.push(format!("**Additional insights ({}):**\n{}", label, text));
    }
    for o in outcomes.iter().filter(|o| !o.is_ok() || o.text.is_none())
    {   sections.push(unavailable_marker(&o.label));
    }
    sections.join("\n\n")
}

fn points(outcomes: &[ProviderOutcome]) -> String
{   let per_provider: Vec<Vec<String>> = outcomes
      .iter()
      .map(|o| match (&o.text, o.is_ok())
        {   (Some(text), true) => text
              .lines()
              .map(strip_bullet)
              .filter(|l| !l.is_empty())
              .take(POINTS_PER_PROVIDER)
              .map(str::to_string)
              .collect()
          , _ => vec![unavailable_marker(&o.label)]
        })
      .collect();

    let mut out = vec![POINTS_PREAMBLE.to_string()];
    for round in 0..POINTS_PER_PROVIDER
    {   for lines in &per_provider
        {   if let Some(line) = lines.get(round)
            {   out.push(format!("- {}", line));
            }
        }
    }
    out.join("\n")
}

fn strip_bullet(line: &str) -> &str
{   line.trim()
      .trim_start_matches(|c: char| c == '-' || c == '*' || c == '•')
      .trim()
}
