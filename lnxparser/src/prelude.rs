//! Everything a node needs to bring itself up from an lnx file.
pub use crate::config::{ParserOptions, TimingParameters};
pub use crate::error::{ErrorKind, ParseError, ReferenceError};
pub use crate::topology::{Interface, Neighbor, RipNeighbor, RoutingMode, StaticRoute, Topology};
pub use ipnet::Ipv4Net;
pub use std::net::{Ipv4Addr, SocketAddrV4};
pub use std::time::Duration;
