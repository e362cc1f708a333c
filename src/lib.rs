//! Weekly course timetable builder.
//!
//! Given a course catalog, the slot patterns shared by its courses and a
//! student's constraints, produces a short ranked list of distinct,
//! conflict-free timetables that land inside the student's credit band.
//! Each candidate can then be inspected for per-course swaps and edited
//! under the same rules.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Slot`, `Course`, `Catalog`, `Pattern`,
//!   `ConstraintSet`, `Timetable`
//! - **`scoring`**: Course scores, temperature-controlled candidate
//!   ordering, pattern scoring
//! - **`scheduler`**: The search (`TimetableSolver`), credit filling,
//!   diversity filtering, swap discovery, edits and summaries
//! - **`session`**: Edit-session state machine over the candidates
//! - **`export`**: iCalendar export with period clock times
//! - **`config`**: Defaults merged with a user JSON file
//! - **`validation`**: Input integrity checks (duplicate ids, malformed
//!   schedules, pattern references)
//! - **`logging`**: `tracing` subscriber setup
//!
//! # Pipeline
//!
//! ```text
//! patterns ─ score ─ select ─┬─ seed timetable ─ fill credits ─ signature filter ─ candidates
//!                            └─ (per pattern, until max_candidates)
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Kirkpatrick et al. (1983), "Optimization by Simulated Annealing" (temperature analogy)

pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod validation;
