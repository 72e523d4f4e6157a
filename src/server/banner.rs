//! Server log banner parsing and connection variables

use std::sync::LazyLock;

use regex::Regex;

/// Matches the listening banner, e.g.
/// `=== SAS Cloud Analytic Services server ready on cashost.example.com:5570 (binary) and http://cashost.example.com:8777 ===`
static BANNER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"===\s+.+?(\S+):(\d+)\s+.+?\s+.+?:(\d+)\s+===").unwrap());

/// Connection endpoints announced in the server log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerBanner {
    pub hostname: String,
    pub binary_port: u16,
    pub http_port: u16,
}

impl ServerBanner {
    /// Find the listening banner in log text
    pub fn parse(log: &str) -> Option<Self> {
        let captures = BANNER_RE.captures(log)?;

        Some(Self {
            hostname: captures[1].to_string(),
            binary_port: captures[2].parse().ok()?,
            http_port: captures[3].parse().ok()?,
        })
    }

    pub fn binary_url(&self) -> String {
        format!("cas://{}:{}", self.hostname, self.binary_port)
    }

    pub fn http_url(&self) -> String {
        format!("http://{}:{}", self.hostname, self.http_port)
    }
}

/// Which protocol the test run asked for through its environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolPreference {
    /// `CASPROTOCOL` or `CAS_PROTOCOL` names the protocol
    Explicit(String),
    /// `REQUIRES_TK` tells whether the binary protocol is needed
    RequiresTk(bool),
    /// Nothing set; no protocol variables are emitted
    Unset,
}

impl ProtocolPreference {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(protocol) = lookup("CASPROTOCOL").or_else(|| lookup("CAS_PROTOCOL")) {
            return ProtocolPreference::Explicit(protocol);
        }
        if let Some(requires_tk) = lookup("REQUIRES_TK") {
            return ProtocolPreference::RequiresTk(requires_tk == "true");
        }
        ProtocolPreference::Unset
    }

    /// The protocol to advertise, if any
    pub fn protocol(&self) -> Option<&str> {
        match self {
            ProtocolPreference::Explicit(protocol) => Some(protocol),
            ProtocolPreference::RequiresTk(true) => Some("cas"),
            ProtocolPreference::RequiresTk(false) => Some("http"),
            ProtocolPreference::Unset => None,
        }
    }
}

/// Shell variable assignments describing how to reach the server
pub fn connection_variables(
    banner: &ServerBanner,
    preference: &ProtocolPreference,
) -> Vec<(&'static str, String)> {
    let mut vars = vec![
        ("CASHOST", banner.hostname.clone()),
        ("CAS_HOST", banner.hostname.clone()),
        ("CAS_BINARY_PORT", banner.binary_port.to_string()),
        ("CAS_HTTP_PORT", banner.http_port.to_string()),
        ("CAS_BINARY_URL", banner.binary_url()),
        ("CAS_HTTP_URL", banner.http_url()),
    ];

    let Some(protocol) = preference.protocol() else {
        return vars;
    };

    let (port, url) = if protocol == "cas" {
        (banner.binary_port, banner.binary_url())
    } else {
        (
            banner.http_port,
            format!("{}://{}:{}", protocol, banner.hostname, banner.http_port),
        )
    };

    vars.extend([
        ("CASPROTOCOL", protocol.to_string()),
        ("CAS_PROTOCOL", protocol.to_string()),
        ("CASPORT", port.to_string()),
        ("CAS_PORT", port.to_string()),
        ("CASURL", url.clone()),
        ("CAS_URL", url),
    ]);

    vars
}

/// Format assignments as `KEY=VALUE` pairs separated by spaces
pub fn format_variables(vars: &[(&str, String)]) -> String {
    vars.iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    const LOG: &str = "\
2024-03-01T10:00:00 NOTE: Loading configuration
2024-03-01T10:00:02 NOTE: === SAS Cloud Analytic Services server ready on cashost.example.com:5570 (binary) and http://cashost.example.com:8777 ===
2024-03-01T10:00:03 NOTE: Ready
";

    fn banner() -> ServerBanner {
        ServerBanner {
            hostname: "cashost.example.com".to_string(),
            binary_port: 5570,
            http_port: 8777,
        }
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn parse_extracts_host_and_ports() {
        assert_eq!(ServerBanner::parse(LOG), Some(banner()));
    }

    #[rstest]
    #[case("")]
    #[case("NOTE: starting server\n")]
    #[case("=== server starting ===\n")]
    fn parse_returns_none_without_banner(#[case] log: &str) {
        assert_eq!(ServerBanner::parse(log), None);
    }

    #[rstest]
    #[case(vec![], ProtocolPreference::Unset)]
    #[case(vec![("CASPROTOCOL", "cas")], ProtocolPreference::Explicit("cas".to_string()))]
    #[case(vec![("CAS_PROTOCOL", "https")], ProtocolPreference::Explicit("https".to_string()))]
    #[case(
        vec![("CASPROTOCOL", "http"), ("CAS_PROTOCOL", "cas")],
        ProtocolPreference::Explicit("http".to_string())
    )]
    #[case(
        vec![("CAS_PROTOCOL", "https"), ("REQUIRES_TK", "true")],
        ProtocolPreference::Explicit("https".to_string())
    )]
    #[case(vec![("REQUIRES_TK", "true")], ProtocolPreference::RequiresTk(true))]
    #[case(vec![("REQUIRES_TK", "false")], ProtocolPreference::RequiresTk(false))]
    fn preference_from_lookup_returns_expected(
        #[case] vars: Vec<(&str, &str)>,
        #[case] expected: ProtocolPreference,
    ) {
        assert_eq!(ProtocolPreference::from_lookup(lookup_from(&vars)), expected);
    }

    #[test]
    fn connection_variables_without_protocol() {
        let vars = connection_variables(&banner(), &ProtocolPreference::Unset);

        assert_eq!(
            format_variables(&vars),
            "CASHOST=cashost.example.com CAS_HOST=cashost.example.com \
             CAS_BINARY_PORT=5570 CAS_HTTP_PORT=8777 \
             CAS_BINARY_URL=cas://cashost.example.com:5570 \
             CAS_HTTP_URL=http://cashost.example.com:8777"
        );
    }

    #[rstest]
    #[case(ProtocolPreference::Explicit("cas".to_string()), "cas", "5570", "cas://cashost.example.com:5570")]
    #[case(ProtocolPreference::RequiresTk(true), "cas", "5570", "cas://cashost.example.com:5570")]
    #[case(ProtocolPreference::RequiresTk(false), "http", "8777", "http://cashost.example.com:8777")]
    #[case(ProtocolPreference::Explicit("https".to_string()), "https", "8777", "https://cashost.example.com:8777")]
    fn connection_variables_with_protocol(
        #[case] preference: ProtocolPreference,
        #[case] protocol: &str,
        #[case] port: &str,
        #[case] url: &str,
    ) {
        let vars = connection_variables(&banner(), &preference);
        let vars: HashMap<&str, &str> = vars.iter().map(|(k, v)| (*k, v.as_str())).collect();

        assert_eq!(vars["CASPROTOCOL"], protocol);
        assert_eq!(vars["CAS_PROTOCOL"], protocol);
        assert_eq!(vars["CASPORT"], port);
        assert_eq!(vars["CAS_PORT"], port);
        assert_eq!(vars["CASURL"], url);
        assert_eq!(vars["CAS_URL"], url);
    }
}
