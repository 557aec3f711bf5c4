// Shared system instructions.
// Each use-case builds its own user prompt alongside it (optimizer::prompts);
// this file holds the fixed system messages sent with those prompts.

/// System instruction for the resume rewrite call.
pub const REWRITE_SYSTEM: &str = "Expert resume writer and reviewer";

/// System instruction for the ATS scoring call.
pub const SCORING_SYSTEM: &str =
    "Applicant Tracking System (ATS) resume scanner similar to Jobscan";
