use std::collections::HashSet;
use std::fmt;
use std::io::BufRead;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::Path;
use std::str::FromStr;

use ipnet::Ipv4Net;
use log::{debug, info, trace};

use crate::config::{ParserOptions, TimingParameters};
use crate::directive::{self, Directive, Line, RipDirective, TcpDirective};
use crate::error::{FieldError, ParseError, ReferenceError};
use crate::reader::{self, NumberedLines};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoutingMode {
    /// Local and manually specified routes only (hosts)
    #[default]
    Static,
    /// Advertise and learn routes via RIP (routers)
    Rip,
}

impl TryFrom<&str> for RoutingMode {
    type Error = FieldError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "static" => Ok(Self::Static),
            "rip" => Ok(Self::Rip),
            _ => Err(FieldError::InvalidEnum(value.to_string())),
        }
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RoutingMode::Static => write!(f, "static"),
            RoutingMode::Rip => write!(f, "rip"),
        }
    }
}

/// An interface of this node.
/// Format: interface <name> <virtual IP>/<prefix> <UDP address>:<UDP port>
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interface {
    name: String,
    // Virtual ip + prefix, host bits kept
    assigned: Ipv4Net,
    udp_addr: Ipv4Addr,
    udp_port: u16,
}

impl Interface {
    pub fn new(name: String, assigned: Ipv4Net, udp_addr: Ipv4Addr, udp_port: u16) -> Self {
        Interface {
            name,
            assigned,
            udp_addr,
            udp_port,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn assigned_ip(&self) -> Ipv4Addr {
        self.assigned.addr()
    }
    pub fn prefix_len(&self) -> u8 {
        self.assigned.prefix_len()
    }
    /// `assigned_ip/prefix_len` exactly as configured, e.g. 10.0.0.1/24
    pub fn assigned_prefix(&self) -> Ipv4Net {
        self.assigned
    }
    /// The network the interface sits on, e.g. 10.0.0.0/24 for 10.0.0.1/24
    pub fn network(&self) -> Ipv4Net {
        self.assigned.trunc()
    }
    pub fn udp_addr(&self) -> Ipv4Addr {
        self.udp_addr
    }
    pub fn udp_port(&self) -> u16 {
        self.udp_port
    }
    /// Bind address of the UDP socket backing this interface
    pub fn udp_socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.udp_addr, self.udp_port)
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "interface {} {} {}:{}",
            self.name, self.assigned, self.udp_addr, self.udp_port
        )
    }
}

/// How to reach a directly connected node (there is no ARP, so the link-layer
/// address is spelled out as a UDP endpoint).
/// Format: neighbor <virtual IP> at <UDP address>:<UDP port> via <interface>
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Neighbor {
    pub dest_addr: Ipv4Addr,
    pub udp_addr: Ipv4Addr,
    pub udp_port: u16,
    pub interface_name: String,
}

impl Neighbor {
    pub fn udp_socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.udp_addr, self.udp_port)
    }
}

impl fmt::Display for Neighbor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "neighbor {} at {}:{} via {}",
            self.dest_addr, self.udp_addr, self.udp_port, self.interface_name
        )
    }
}

/// Router that should receive our RIP requests and updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RipNeighbor {
    pub dest: Ipv4Addr,
}

impl fmt::Display for RipNeighbor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "rip advertise-to {}", self.dest)
    }
}

/// Format: route <network>/<prefix> via <next hop>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StaticRoute {
    prefix: Ipv4Net,
    next_hop: Ipv4Addr,
}

impl StaticRoute {
    pub fn new(prefix: Ipv4Net, next_hop: Ipv4Addr) -> Self {
        StaticRoute { prefix, next_hop }
    }
    pub fn network_addr(&self) -> Ipv4Addr {
        self.prefix.addr()
    }
    pub fn prefix_len(&self) -> u8 {
        self.prefix.prefix_len()
    }
    pub fn prefix(&self) -> Ipv4Net {
        self.prefix
    }
    pub fn next_hop(&self) -> Ipv4Addr {
        self.next_hop
    }
}

impl fmt::Display for StaticRoute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "route {} via {}", self.prefix, self.next_hop)
    }
}

/// Everything an lnx file describes about one node.
///
/// A `Topology` only comes out of a parse that consumed the whole input; the
/// first bad line aborts the parse and nothing partial is handed back.
/// Collections keep declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Topology {
    interfaces: Vec<Interface>,
    neighbors: Vec<Neighbor>,
    rip_neighbors: Vec<RipNeighbor>,
    static_routes: Vec<StaticRoute>,
    routing_mode: RoutingMode,
    timing: TimingParameters,
}

impl Topology {
    fn empty(options: &ParserOptions) -> Self {
        Topology {
            routing_mode: options.routing_mode,
            timing: options.defaults,
            ..Topology::default()
        }
    }

    /// Parse the lnx file at `path` with default options
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        Self::from_path_with(path, &ParserOptions::default())
    }

    pub fn from_path_with(path: impl AsRef<Path>, options: &ParserOptions) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let topology = Self::parse_lines(reader::open(path)?, options)?;
        info!(
            "loaded {}: {} interfaces, {} neighbors, {} static routes, {} rip neighbors, routing {}",
            path.display(),
            topology.interfaces.len(),
            topology.neighbors.len(),
            topology.static_routes.len(),
            topology.rip_neighbors.len(),
            topology.routing_mode
        );
        Ok(topology)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        Self::from_reader_with(reader, &ParserOptions::default())
    }

    pub fn from_reader_with<R: BufRead>(reader: R, options: &ParserOptions) -> Result<Self, ParseError> {
        Self::parse_lines(NumberedLines::new(reader), options)
    }

    /// Parse a config based on its contents as a string
    pub fn parse_str(config: &str) -> Result<Self, ParseError> {
        Self::parse_str_with(config, &ParserOptions::default())
    }

    pub fn parse_str_with(config: &str, options: &ParserOptions) -> Result<Self, ParseError> {
        Self::from_reader_with(config.as_bytes(), options)
    }

    fn parse_lines<I>(lines: I, options: &ParserOptions) -> Result<Self, ParseError>
    where
        I: Iterator<Item = Result<(usize, String), ParseError>>,
    {
        let mut topology = Topology::empty(options);
        for next in lines {
            let (line, text) = next?;
            match directive::classify(&text).map_err(|e| e.at(line))? {
                Line::Skip => trace!("line {line}: skipped"),
                Line::Unknown(token) if options.strict_directives => {
                    return Err(ParseError::Syntax {
                        line,
                        message: format!("Unrecognized directive {token:?}"),
                    })
                }
                Line::Unknown(token) => debug!("line {line}: ignoring unknown directive {token:?}"),
                Line::Directive(directive) => {
                    debug!("line {line}: {directive}");
                    topology.apply(directive);
                }
            }
        }
        Ok(topology)
    }

    /// Record one validated directive. Scalars are overwritten, so the last
    /// occurrence of a repeated `routing`/`rip`/`tcp` setting wins.
    fn apply(&mut self, directive: Directive) {
        match directive {
            Directive::Interface(interface) => self.interfaces.push(interface),
            Directive::Neighbor(neighbor) => self.neighbors.push(neighbor),
            Directive::Routing(mode) => self.routing_mode = mode,
            Directive::Route(route) => self.static_routes.push(route),
            Directive::Rip(RipDirective::PeriodicUpdateRate(ms)) => {
                self.timing.rip_periodic_update_rate_ms = ms
            }
            Directive::Rip(RipDirective::RouteTimeoutThreshold(ms)) => {
                self.timing.rip_timeout_threshold_ms = ms
            }
            Directive::Rip(RipDirective::AdvertiseTo(dest)) => {
                self.rip_neighbors.push(RipNeighbor { dest })
            }
            Directive::Tcp(TcpDirective::RtoMin(us)) => self.timing.tcp_rto_min_us = us,
            Directive::Tcp(TcpDirective::RtoMax(us)) => self.timing.tcp_rto_max_us = us,
        }
    }

    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }
    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }
    pub fn rip_neighbors(&self) -> &[RipNeighbor] {
        &self.rip_neighbors
    }
    pub fn static_routes(&self) -> &[StaticRoute] {
        &self.static_routes
    }
    pub fn routing_mode(&self) -> RoutingMode {
        self.routing_mode
    }
    pub fn timing(&self) -> &TimingParameters {
        &self.timing
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    /// Neighbors reachable through the named interface, in declaration order
    pub fn neighbors_via<'a>(&'a self, interface_name: &'a str) -> impl Iterator<Item = &'a Neighbor> + 'a {
        self.neighbors
            .iter()
            .filter(move |n| n.interface_name == interface_name)
    }

    /// Cross-directive checks the parser deliberately leaves to consumers:
    /// every neighbor names a declared interface, and every `rip advertise-to`
    /// address is a declared neighbor. Returns every problem found.
    pub fn check_references(&self) -> Vec<ReferenceError> {
        let interface_names: HashSet<&str> = self.interfaces.iter().map(|i| i.name()).collect();
        let neighbor_addrs: HashSet<Ipv4Addr> = self.neighbors.iter().map(|n| n.dest_addr).collect();

        let bad_neighbors = self
            .neighbors
            .iter()
            .filter(|n| !interface_names.contains(n.interface_name.as_str()))
            .map(|n| ReferenceError::UnknownInterface {
                neighbor: n.dest_addr,
                interface: n.interface_name.clone(),
            });
        let bad_rip = self
            .rip_neighbors
            .iter()
            .filter(|r| !neighbor_addrs.contains(&r.dest))
            .map(|r| ReferenceError::UnknownRipNeighbor(r.dest));
        bad_neighbors.chain(bad_rip).collect()
    }
}

impl FromStr for Topology {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topology::parse_str(s)
    }
}

/// Writes the topology back out as lnx directives, one per line
impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for interface in &self.interfaces {
            writeln!(f, "{interface}")?;
        }
        for neighbor in &self.neighbors {
            writeln!(f, "{neighbor}")?;
        }
        writeln!(f, "routing {}", self.routing_mode)?;
        for route in &self.static_routes {
            writeln!(f, "{route}")?;
        }
        for rip_neighbor in &self.rip_neighbors {
            writeln!(f, "{rip_neighbor}")?;
        }
        write!(f, "{}", self.timing)
    }
}
