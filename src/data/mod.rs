/// Data layer: the session, CSV loading, and the read-only views over it.
///
/// Architecture:
/// ```text
///   uploaded .csv bytes + ParseOptions
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode → parse → infer types → Dataset
///   └──────────┘
///        │  (replaces on success only)
///        ▼
///   ┌──────────┐
///   │  session  │  Option<Dataset>
///   └──────────┘
///        │  &Session
///        ├──────────────┬──────────────┐
///        ▼              ▼              ▼
///   ┌──────────┐  ┌──────────┐  ┌──────────┐
///   │ inspect   │  │  select   │  │  filter   │
///   └──────────┘  └──────────┘  └──────────┘
///    summaries     projections    predicate → subset → CSV
/// ```

pub mod filter;
pub mod inspect;
pub mod loader;
pub mod model;
pub mod select;
pub mod session;
pub mod stats;
