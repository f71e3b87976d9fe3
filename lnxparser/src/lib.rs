//! Parser for lnx files, the line-oriented description of one node of a
//! virtual IP network: its interfaces, neighbors, routing mode, static routes,
//! RIP peers and protocol timers.
//!
//! ```
//! use lnxparser::{RoutingMode, Topology};
//!
//! let topology: Topology = "interface if0 10.0.0.1/24 127.0.0.1:5000\n\
//!                           neighbor 10.0.0.2 at 127.0.0.1:5001 via if0\n\
//!                           routing rip\n"
//!     .parse()
//!     .unwrap();
//! assert_eq!(topology.interfaces()[0].name(), "if0");
//! assert_eq!(topology.routing_mode(), RoutingMode::Rip);
//! ```
//!
//! Parsing is all-or-nothing: the first malformed line aborts the parse with a
//! [`ParseError`] naming that line. Unknown directive keywords are skipped.

pub mod config;
pub mod directive;
pub mod error;
mod fields;
pub mod prelude;
pub mod reader;
pub mod topology;

pub use config::{ParserOptions, TimingParameters};
pub use directive::{classify, Directive, Line};
pub use error::{ErrorKind, FieldError, ParseError, ReferenceError};
pub use fields::{MAX_NAME_LEN, MAX_PREFIX_LEN};
pub use topology::{Interface, Neighbor, RipNeighbor, RoutingMode, StaticRoute, Topology};
