use std::fmt;
use std::net::Ipv4Addr;

use crate::error::FieldError;
use crate::fields::{parse_addr_port, parse_addr_prefix, Fields};
use crate::topology::{Interface, Neighbor, RipNeighbor, RoutingMode, StaticRoute};

/// First tokens longer than this can never name a directive
pub const MAX_DIRECTIVE_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Interface(Interface),
    Neighbor(Neighbor),
    Routing(RoutingMode),
    Rip(RipDirective),
    Route(StaticRoute),
    Tcp(TcpDirective),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RipDirective {
    PeriodicUpdateRate(u64), // ms
    RouteTimeoutThreshold(u64), // ms
    AdvertiseTo(Ipv4Addr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpDirective {
    RtoMin(u64), // us
    RtoMax(u64), // us
}

/// Outcome of classifying one raw line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// Blank, whitespace-only or full-line comment
    Skip,
    /// First token is not a directive keyword
    Unknown(&'a str),
    Directive(Directive),
}

/// Classifies a raw line and, for known directives, extracts and validates
/// its fields.
///
/// Unknown first tokens are reported as [`Line::Unknown`] rather than as
/// errors, but an unknown sub-directive under `rip` or `tcp` is a syntax
/// error.
pub fn classify(line: &str) -> Result<Line<'_>, FieldError> {
    if line.is_empty() || line.starts_with('#') {
        return Ok(Line::Skip);
    }
    let trimmed = line.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (keyword, rest) = match trimmed.find(|c: char| c.is_ascii_whitespace()) {
        Some(end) => trimmed.split_at(end),
        None => (trimmed, ""),
    };
    // Indented comments are comments too
    if keyword.is_empty() || keyword.starts_with('#') {
        return Ok(Line::Skip);
    }
    if keyword.len() > MAX_DIRECTIVE_LEN {
        return Ok(Line::Unknown(keyword));
    }

    let fields = Fields::new(rest);
    let directive = match keyword {
        "interface" => Directive::Interface(interface(fields)?),
        "neighbor" => Directive::Neighbor(neighbor(fields)?),
        "routing" => Directive::Routing(routing(fields)?),
        "rip" => Directive::Rip(rip(fields)?),
        "route" => Directive::Route(route(fields)?),
        "tcp" => Directive::Tcp(tcp(fields)?),
        _ => return Ok(Line::Unknown(keyword)),
    };
    Ok(Line::Directive(directive))
}

// interface <name> <addr>/<prefix> <addr>:<port>
fn interface(mut fields: Fields<'_>) -> Result<Interface, FieldError> {
    let name = fields.name("interface name")?;
    let assigned = parse_addr_prefix(fields.next("<addr>/<prefix>")?)?;
    let (udp_addr, udp_port) = parse_addr_port(fields.next("<addr>:<port>")?)?;
    fields.finish()?;
    Ok(Interface::new(name, assigned, udp_addr, udp_port))
}

// neighbor <addr> at <addr>:<port> via <ifname>
fn neighbor(mut fields: Fields<'_>) -> Result<Neighbor, FieldError> {
    let dest_addr = fields.addr("neighbor address")?;
    fields.keyword("at")?;
    let (udp_addr, udp_port) = parse_addr_port(fields.next("<addr>:<port>")?)?;
    fields.keyword("via")?;
    let interface_name = fields.name_until_comment("interface name")?;
    fields.finish()?;
    Ok(Neighbor {
        dest_addr,
        udp_addr,
        udp_port,
        interface_name,
    })
}

fn routing(mut fields: Fields<'_>) -> Result<RoutingMode, FieldError> {
    let mode = RoutingMode::try_from(fields.next("routing mode")?)?;
    fields.finish()?;
    Ok(mode)
}

fn rip(mut fields: Fields<'_>) -> Result<RipDirective, FieldError> {
    let directive = match fields.next("rip directive")? {
        "periodic-update-rate" => RipDirective::PeriodicUpdateRate(fields.number("update rate")?),
        "route-timeout-threshold" => {
            RipDirective::RouteTimeoutThreshold(fields.number("timeout threshold")?)
        }
        "advertise-to" => RipDirective::AdvertiseTo(fields.addr("rip neighbor address")?),
        other => {
            return Err(FieldError::syntax(format!(
                "Unexpected RIP directive {other:?}"
            )))
        }
    };
    fields.finish()?;
    Ok(directive)
}

// route <addr>/<prefix> via <addr>
fn route(mut fields: Fields<'_>) -> Result<StaticRoute, FieldError> {
    let prefix = parse_addr_prefix(fields.next("<addr>/<prefix>")?)?;
    fields.keyword("via")?;
    let next_hop = fields.addr("next hop address")?;
    fields.finish()?;
    Ok(StaticRoute::new(prefix, next_hop))
}

fn tcp(mut fields: Fields<'_>) -> Result<TcpDirective, FieldError> {
    let directive = match fields.next("tcp directive")? {
        "rto-min" => TcpDirective::RtoMin(fields.number("rto-min")?),
        "rto-max" => TcpDirective::RtoMax(fields.number("rto-max")?),
        other => {
            return Err(FieldError::syntax(format!(
                "Unrecognized TCP directive {other:?}"
            )))
        }
    };
    fields.finish()?;
    Ok(directive)
}

impl fmt::Display for RipDirective {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RipDirective::PeriodicUpdateRate(ms) => write!(f, "rip periodic-update-rate {ms}"),
            RipDirective::RouteTimeoutThreshold(ms) => {
                write!(f, "rip route-timeout-threshold {ms}")
            }
            RipDirective::AdvertiseTo(dest) => write!(f, "{}", RipNeighbor { dest: *dest }),
        }
    }
}

impl fmt::Display for TcpDirective {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TcpDirective::RtoMin(us) => write!(f, "tcp rto-min {us}"),
            TcpDirective::RtoMax(us) => write!(f, "tcp rto-max {us}"),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Directive::Interface(interface) => write!(f, "{interface}"),
            Directive::Neighbor(neighbor) => write!(f, "{neighbor}"),
            Directive::Routing(mode) => write!(f, "routing {mode}"),
            Directive::Rip(rip) => write!(f, "{rip}"),
            Directive::Route(route) => write!(f, "{route}"),
            Directive::Tcp(tcp) => write!(f, "{tcp}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn directive(line: &str) -> Directive {
        match classify(line).unwrap() {
            Line::Directive(d) => d,
            other => panic!("expected a directive from {line:?}, got {other:?}"),
        }
    }

    fn error_kind(line: &str) -> ErrorKind {
        classify(line).unwrap_err().kind()
    }

    #[test]
    fn test_skip_blank_and_comments() {
        assert_eq!(classify("").unwrap(), Line::Skip);
        assert_eq!(classify("   \t ").unwrap(), Line::Skip);
        assert_eq!(classify("# interface if0 garbage").unwrap(), Line::Skip);
        assert_eq!(classify("#routing bogus").unwrap(), Line::Skip);
        assert_eq!(classify("  # indented comment").unwrap(), Line::Skip);
    }

    #[test]
    fn test_unknown_directives_are_not_errors() {
        assert_eq!(classify("bogus directive here").unwrap(), Line::Unknown("bogus"));
        assert_eq!(classify("interfaces if0").unwrap(), Line::Unknown("interfaces"));
        assert_eq!(
            classify("interface-with-a-long-name if0").unwrap(),
            Line::Unknown("interface-with-a-long-name")
        );
    }

    #[test]
    fn test_interface() {
        let Directive::Interface(interface) = directive("interface if0 10.0.0.1/24 127.0.0.1:5000") else {
            panic!("not an interface");
        };
        assert_eq!(interface.name(), "if0");
        assert_eq!(interface.assigned_ip(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(interface.prefix_len(), 24);
        assert_eq!(interface.udp_addr(), Ipv4Addr::LOCALHOST);
        assert_eq!(interface.udp_port(), 5000);
    }

    #[test]
    fn test_interface_errors() {
        assert_eq!(error_kind("interface if0 10.0.0.1/24"), ErrorKind::Syntax);
        assert_eq!(error_kind("interface if0 10.0.0.1 127.0.0.1:5000"), ErrorKind::Syntax);
        assert_eq!(error_kind("interface if0 10.0.0.1/33 127.0.0.1:5000"), ErrorKind::InvalidNumber);
        assert_eq!(error_kind("interface if0 10.0.0/24 127.0.0.1:5000"), ErrorKind::InvalidAddress);
        assert_eq!(error_kind("interface if0 10.0.0.1/24 127.0.0.1:port"), ErrorKind::InvalidNumber);
        assert_eq!(error_kind("interface if0 10.0.0.1/24 127.0.0.1:5000 extra"), ErrorKind::Syntax);
    }

    #[test]
    fn test_neighbor_with_trailing_comment() {
        let expected = Directive::Neighbor(Neighbor {
            dest_addr: Ipv4Addr::new(10, 2, 0, 3),
            udp_addr: Ipv4Addr::LOCALHOST,
            udp_port: 5003,
            interface_name: String::from("if0"),
        });
        assert_eq!(directive("neighbor 10.2.0.3 at 127.0.0.1:5003 via if0"), expected);
        assert_eq!(directive("neighbor 10.2.0.3 at 127.0.0.1:5003 via if0 # thing"), expected);
        assert_eq!(directive("neighbor 10.2.0.3 at 127.0.0.1:5003 via if0#thing"), expected);
    }

    #[test]
    fn test_neighbor_errors() {
        assert_eq!(error_kind("neighbor 10.2.0.3 127.0.0.1:5003 via if0"), ErrorKind::Syntax);
        assert_eq!(error_kind("neighbor 10.2.0.3 at 127.0.0.1:5003 on if0"), ErrorKind::Syntax);
        assert_eq!(error_kind("neighbor 10.2.0.3 at 127.0.0.1:5003 via"), ErrorKind::Syntax);
        assert_eq!(error_kind("neighbor 10.2.0.300 at 127.0.0.1:5003 via if0"), ErrorKind::InvalidAddress);
        assert_eq!(error_kind("neighbor 10.2.0.3 at localhost:5003 via if0"), ErrorKind::InvalidAddress);
    }

    #[test]
    fn test_routing() {
        assert_eq!(directive("routing rip"), Directive::Routing(RoutingMode::Rip));
        assert_eq!(directive("routing static"), Directive::Routing(RoutingMode::Static));
        assert_eq!(error_kind("routing ospf"), ErrorKind::InvalidEnum);
        assert_eq!(error_kind("routing"), ErrorKind::Syntax);
        assert_eq!(error_kind("routing rip static"), ErrorKind::Syntax);
    }

    #[test]
    fn test_rip() {
        assert_eq!(
            directive("rip periodic-update-rate 1000"),
            Directive::Rip(RipDirective::PeriodicUpdateRate(1000))
        );
        assert_eq!(
            directive("rip route-timeout-threshold 2500 # in milliseconds"),
            Directive::Rip(RipDirective::RouteTimeoutThreshold(2500))
        );
        assert_eq!(
            directive("rip advertise-to 10.0.0.2"),
            Directive::Rip(RipDirective::AdvertiseTo(Ipv4Addr::new(10, 0, 0, 2)))
        );
    }

    #[test]
    fn test_rip_errors() {
        assert_eq!(error_kind("rip unknown-subdirective 5"), ErrorKind::Syntax);
        assert_eq!(error_kind("rip"), ErrorKind::Syntax);
        assert_eq!(error_kind("rip periodic-update-rate"), ErrorKind::Syntax);
        assert_eq!(error_kind("rip periodic-update-rate fast"), ErrorKind::InvalidNumber);
        assert_eq!(error_kind("rip advertise-to 10.0.0"), ErrorKind::InvalidAddress);
    }

    #[test]
    fn test_route() {
        let Directive::Route(route) = directive("route 10.1.0.0/16 via 10.0.0.2") else {
            panic!("not a route");
        };
        assert_eq!(route.network_addr(), Ipv4Addr::new(10, 1, 0, 0));
        assert_eq!(route.prefix_len(), 16);
        assert_eq!(route.next_hop(), Ipv4Addr::new(10, 0, 0, 2));
        assert_eq!(error_kind("route 10.1.0.0/16 10.0.0.2"), ErrorKind::Syntax);
        assert_eq!(error_kind("route 10.1.0.0/16 via"), ErrorKind::Syntax);
    }

    #[test]
    fn test_tcp() {
        assert_eq!(directive("tcp rto-min 2000"), Directive::Tcp(TcpDirective::RtoMin(2000)));
        assert_eq!(directive("tcp rto-max 9000000"), Directive::Tcp(TcpDirective::RtoMax(9_000_000)));
        assert_eq!(error_kind("tcp rto-avg 10"), ErrorKind::Syntax);
        assert_eq!(error_kind("tcp rto-min -10"), ErrorKind::InvalidNumber);
    }

    #[test]
    fn test_directive_display_reparses() {
        for line in [
            "interface if0 10.0.0.1/24 127.0.0.1:5000",
            "neighbor 10.0.0.2 at 127.0.0.1:5001 via if0",
            "routing rip",
            "rip periodic-update-rate 5000",
            "rip route-timeout-threshold 12000",
            "rip advertise-to 10.0.0.2",
            "route 10.1.0.0/16 via 10.0.0.2",
            "tcp rto-min 1000",
            "tcp rto-max 5000000",
        ] {
            assert_eq!(directive(line).to_string(), line);
        }
    }
}
