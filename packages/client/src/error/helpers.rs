use std::fmt;

macro_rules! marker_error {
    ($(#[$doc:meta])* $name:ident, $msg:literal) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name;

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str($msg)
            }
        }

        impl std::error::Error for $name {}
    };
}

marker_error!(
    /// A chunked body was followed by trailer fields.
    TrailersUnsupported,
    "HTTP trailers not supported"
);

marker_error!(
    /// The header block exceeded the configured limit.
    HeaderTooLarge,
    "header block too large"
);

marker_error!(
    /// A `Content-Length` value was not a decimal byte count.
    InvalidContentLength,
    "invalid Content-Length"
);

marker_error!(
    /// A request or response head could not be parsed.
    MalformedHead,
    "malformed message head"
);

marker_error!(
    /// The transport ended before the message was complete.
    IncompleteMessage,
    "incomplete message"
);

marker_error!(
    /// The resolver produced no usable candidate address.
    NoAddresses,
    "no addresses to connect to"
);
