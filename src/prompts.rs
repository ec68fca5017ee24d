use crate::session::Job;
use serde_json::{json, Value};

/// Exact phrase the judge answers with when the drawing does not fit.
pub const TRY_AGAIN_PHRASE: &str = "Try again!";

pub const JOB_INSTRUCTION: &str = "Invent a fun, whimsical, kid-friendly job that a child \
could have in the future. Give it a short catchy title and a one or two sentence \
description written for a seven year old. Keep it cheerful and imaginative.";

/// Output schema for the job call: an object with two mandatory strings.
pub fn job_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "description": { "type": "STRING" }
        },
        "required": ["title", "description"]
    })
}

pub fn drawing_instruction(job: &Job) -> String {
    format!(
        "A child was asked to draw a picture of this future job.\n\
         Job title: {title}\n\
         Job description: {description}\n\
         Look at the drawing. If it plausibly shows this job, reply with one short, \
         warm, encouraging sentence about what they drew. If it does not, reply with \
         exactly \"{TRY_AGAIN_PHRASE}\" and nothing else.",
        title = job.title,
        description = job.description,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    TryAgain,
}

/// Plain text match on the judge's reply.
pub fn classify_remark(remark: &str) -> Verdict {
    let needle = TRY_AGAIN_PHRASE.trim_end_matches('!').to_lowercase();
    if remark.to_lowercase().contains(&needle) {
        Verdict::TryAgain
    } else {
        Verdict::Match
    }
}
