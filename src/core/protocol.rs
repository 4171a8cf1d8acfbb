use std::net::SocketAddr;

/// Directory protocol: one whitespace-delimited request line per TCP
/// connection, one response, then the hub closes the connection.
///
/// Keywords are case-sensitive. Anything that does not parse is dropped
/// without a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Register { port: u16, files: Vec<String> },
    Query { filename: String },
    List,
    Exit { port: u16 },
}

pub const REGISTERED: &str = "REGISTERED";
pub const GOODBYE: &str = "GOODBYE";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const NO_FILES_AVAILABLE: &str = "NO_FILES_AVAILABLE";

impl Request {
    /// Parse one request line. Dispatches on the first token; trailing junk
    /// after a LIST is ignored. Returns `None` for anything unrecognized or
    /// missing a required argument.
    pub fn parse(line: &str) -> Option<Request> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        let mut parts = line.splitn(2, ' ');
        let command = parts.next()?;
        let rest = parts.next();

        match command {
            "REGISTER" => {
                let mut args = rest?.splitn(2, ' ');
                let port = args.next()?.parse::<u16>().ok()?;
                // The file list is the raw remainder split on commas. Empty
                // segments are kept verbatim; a missing or empty remainder is
                // a legal zero-file registration.
                let files = match args.next() {
                    None | Some("") => Vec::new(),
                    Some(list) => list.split(',').map(str::to_string).collect(),
                };
                Some(Request::Register { port, files })
            }
            "QUERY" => {
                let filename = rest?.to_string();
                Some(Request::Query { filename })
            }
            "LIST" => Some(Request::List),
            "EXIT" => {
                let port = rest?.split_whitespace().next()?.parse::<u16>().ok()?;
                Some(Request::Exit { port })
            }
            _ => None,
        }
    }

    /// Client-side encoding, the exact inverse of `parse` for well-formed
    /// requests.
    pub fn encode(&self) -> String {
        match self {
            Request::Register { port, files } => {
                format!("REGISTER {} {}", port, files.join(","))
            }
            Request::Query { filename } => format!("QUERY {}", filename),
            Request::List => "LIST".to_string(),
            Request::Exit { port } => format!("EXIT {}", port),
        }
    }
}

/// One line of a LIST response.
pub fn format_entry(filename: &str, endpoint: &SocketAddr) -> String {
    format!("{} [hosted by {}]", filename, endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_register_with_files() {
        assert_eq!(
            Request::parse("REGISTER 9001 a.txt,b.txt"),
            Some(Request::Register {
                port: 9001,
                files: vec!["a.txt".to_string(), "b.txt".to_string()],
            })
        );
    }

    #[test]
    fn parse_register_preserves_empty_segments() {
        assert_eq!(
            Request::parse("REGISTER 9001 a.txt,,b.txt"),
            Some(Request::Register {
                port: 9001,
                files: vec!["a.txt".to_string(), "".to_string(), "b.txt".to_string()],
            })
        );
    }

    #[test]
    fn parse_register_zero_files() {
        let expected = Some(Request::Register {
            port: 9001,
            files: Vec::new(),
        });
        assert_eq!(Request::parse("REGISTER 9001 "), expected);
        assert_eq!(Request::parse("REGISTER 9001"), expected);
    }

    #[test]
    fn parse_register_bad_port() {
        assert_eq!(Request::parse("REGISTER abc a.txt"), None);
        assert_eq!(Request::parse("REGISTER"), None);
    }

    #[test]
    fn parse_query_strips_line_terminators() {
        assert_eq!(
            Request::parse("QUERY notes.txt\r\n"),
            Some(Request::Query {
                filename: "notes.txt".to_string(),
            })
        );
    }

    #[test]
    fn parse_query_keeps_interior_spaces() {
        assert_eq!(
            Request::parse("QUERY my notes.txt"),
            Some(Request::Query {
                filename: "my notes.txt".to_string(),
            })
        );
    }

    #[test]
    fn parse_query_without_argument() {
        assert_eq!(Request::parse("QUERY"), None);
    }

    #[test]
    fn parse_list_ignores_trailing_junk() {
        assert_eq!(Request::parse("LIST"), Some(Request::List));
        assert_eq!(Request::parse("LIST junk"), Some(Request::List));
    }

    #[test]
    fn parse_exit() {
        assert_eq!(Request::parse("EXIT 9001"), Some(Request::Exit { port: 9001 }));
        assert_eq!(Request::parse("EXIT"), None);
        assert_eq!(Request::parse("EXIT nope"), None);
    }

    #[test]
    fn parse_unknown_command() {
        assert_eq!(Request::parse("FETCH a.txt"), None);
        assert_eq!(Request::parse(""), None);
        assert_eq!(Request::parse("register 9001 a.txt"), None);
    }

    #[test]
    fn encode_round_trips() {
        let requests = vec![
            Request::Register {
                port: 9001,
                files: vec!["a.txt".to_string(), "b.txt".to_string()],
            },
            Request::Query {
                filename: "a.txt".to_string(),
            },
            Request::List,
            Request::Exit { port: 9001 },
        ];
        for request in requests {
            assert_eq!(Request::parse(&request.encode()), Some(request));
        }
    }

    #[test]
    fn format_list_entry() {
        let endpoint: SocketAddr = "127.0.0.1:9001".parse().unwrap();
        assert_eq!(
            format_entry("a.txt", &endpoint),
            "a.txt [hosted by 127.0.0.1:9001]"
        );
    }
}
