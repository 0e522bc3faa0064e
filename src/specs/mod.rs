// src/specs/mod.rs
//! # Scraping “specs” module
//!
//! Page-specific scraping specifications. Each spec covers a single page type and
//! encodes *where the ground truth lives in the HTML* and *how to extract it
//! robustly*.
//!
//! ## What lives here
//! - **Pure HTML parsing** of fetched pages (`parse_doc`), testable offline.
//! - **Selector choice & precedence** (e.g. prefer the table marked `results`, fall
//!   back to the first table on the page).
//! - **Tolerant extraction** using `core::html` helpers (case-insensitive tag blocks,
//!   tag stripping, whitespace/entity normalization).
//! - **Light shaping** of rows into small structs (`results::ScrapedRow`).
//!
//! ## What does **not** live here
//! - **Identity matching** against the roster (`reconcile`).
//! - **SQL rendering** (`sql::stage_results`).
//! - **Pacing between requests** (`runner::fetch`).
//!
//! ## Typical call chain
//! ```text
//! runner::fetch        → specs::results::fetch(source, url)
//!                      ↘ StagePage { rows, skipped }
//!           reconcile + sql::stage_results::render_script (outside of specs)
//! ```
//!
//! ## Conventions & invariants
//! - **Case-insensitive** tag detection; no full-document regexes.
//! - Scan locally within known blocks (`<table>…</table>`, `<tr>…</tr>`).
//! - A page without any table is an error for that stage only; the batch goes on.
//!
//! ## Current specs
//! - `results` – stage result table: position, rider, team, time/gap, status.
//! - `wiki` – page summary JSON: lead image URL for a rider photo.
pub mod results;
pub mod wiki;
