use http::Uri;
use rustls::pki_types::ServerName;

use crate::error::EndpointError;

/// Utility trait for extracting server names from [`Uri`]s.
pub trait UriExt {
    /// Extracts a [`ServerName`] from the host of this [`Uri`].
    ///
    /// Brackets around IPv6 addresses are trimmed.
    fn get_server_name(&self) -> Result<ServerName<'static>, EndpointError>;

    /// Host of this [`Uri`] followed by the port, when one is written.
    fn server_name_hint(&self) -> Option<String>;
}

impl UriExt for Uri {
    fn get_server_name(&self) -> Result<ServerName<'static>, EndpointError> {
        let hostname = self
            .host()
            .ok_or(EndpointError::MissingHost)?
            .trim_matches(|c| c == '[' || c == ']');

        Ok(ServerName::try_from(hostname.to_owned())?)
    }

    fn server_name_hint(&self) -> Option<String> {
        let host = self.host()?;

        Some(match self.port_u16() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        })
    }
}

/// A remote endpoint that TLS clients connect to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    uri: Uri,
    server_name: ServerName<'static>,
    hint: String,
}

impl Endpoint {
    /// Parses `endpoint` as a URI that must have a host.
    pub fn parse(endpoint: &str) -> Result<Self, EndpointError> {
        let uri = endpoint.parse::<Uri>()?;
        let server_name = uri.get_server_name()?;
        let hint = uri.server_name_hint().ok_or(EndpointError::MissingHost)?;

        Ok(Self {
            uri,
            server_name,
            hint,
        })
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Name the server certificate is verified against.
    pub fn server_name(&self) -> &ServerName<'static> {
        &self.server_name
    }

    /// Host of the endpoint with the port, when one is written.
    pub fn server_name_hint(&self) -> &str {
        &self.hint
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::https_with_port("https://node-3.example.net:4443", "node-3.example.net:4443")]
    #[case::https("https://node-3.example.net", "node-3.example.net")]
    #[case::authority_only("node-3.example.net:4443", "node-3.example.net:4443")]
    #[case::ipv6("https://[::1]:4443/", "[::1]:4443")]
    fn parse_endpoint(#[case] endpoint: &str, #[case] hint: &str) {
        let endpoint = Endpoint::parse(endpoint).unwrap();
        assert_eq!(endpoint.server_name_hint(), hint);
    }

    #[test]
    fn server_name_drops_port_and_brackets() {
        let endpoint = Endpoint::parse("https://[::1]:4443/").unwrap();
        assert_eq!(endpoint.server_name().to_str(), "::1");

        let endpoint = Endpoint::parse("https://node-3.example.net:4443").unwrap();
        assert_eq!(endpoint.server_name().to_str(), "node-3.example.net");
    }

    #[rstest]
    #[case::path_only("/just/a/path")]
    #[case::empty("")]
    fn missing_host(#[case] endpoint: &str) {
        assert!(Endpoint::parse(endpoint).is_err());
    }

    #[rstest]
    #[case::dns("https://node-3.example.net:4443", "node-3.example.net")]
    #[case::ipv4("https://10.0.0.3:4443", "10.0.0.3")]
    #[case::ipv6("https://[fe80::1]", "fe80::1")]
    fn uri_server_name(#[case] uri: &str, #[case] expected: &str) {
        let uri = uri.parse::<Uri>().unwrap();
        assert_eq!(uri.get_server_name().unwrap().to_str(), expected);
    }

    #[test]
    fn uri_without_host() {
        let uri = "/just/a/path".parse::<Uri>().unwrap();

        assert!(matches!(
            uri.get_server_name(),
            Err(EndpointError::MissingHost)
        ));
        assert!(uri.server_name_hint().is_none());
    }

    #[test]
    fn invalid_server_name() {
        let uri = "https://node-.example.net".parse::<Uri>().unwrap();

        assert!(matches!(
            uri.get_server_name(),
            Err(EndpointError::InvalidServerName(..))
        ));
        assert!(matches!(
            Endpoint::parse("https://node-.example.net"),
            Err(EndpointError::InvalidServerName(..))
        ));
    }

    #[test]
    fn unparsable() {
        assert!(matches!(
            Endpoint::parse("https://node 3"),
            Err(EndpointError::Parse(..))
        ));
    }
}
