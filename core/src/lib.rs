//! Blocking client for the National Park Service data API.
//!
//! # Overview
//! [`Client`] builds authenticated requests, sends them through a pluggable
//! [`Transport`], classifies failure statuses into [`ApiError`] and decodes
//! successful JSON bodies into caller-chosen types. It also keeps the
//! server-reported quota from the `X-RateLimit-*` headers.
//!
//! # Design
//! - Requests are plain data ([`HttpRequest`]); [`RequestOption`] values
//!   mutate them in order before they are sent.
//! - The request and response halves can be driven without a transport:
//!   `new_request` and `validate_response` are public.
//! - Resource DTOs ([`Park`] and friends) mirror the API's JSON and carry no
//!   behavior. [`NpsClient`] groups per-resource services.
//!
//! ```no_run
//! use nps_core::{NpsClient, ParksOptions};
//!
//! let nps = NpsClient::new("my-api-key")?;
//! let parks = nps.parks().list(&ParksOptions::new().state_code("WY"))?;
//! for park in &parks.data {
//!     println!("{} ({})", park.full_name, park.park_code);
//! }
//! println!("requests left this hour: {}", nps.rate_limit().remaining);
//! # Ok::<(), nps_core::ApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod nps;
pub mod option;
pub mod parks;
pub mod rate_limit;
pub mod transport;
pub mod types;

pub use client::Client;
pub use config::{ClientConfig, SecretString};
pub use error::{ApiError, RemoteError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ResponseBody};
pub use nps::NpsClient;
pub use option::{with_deadline, with_header, with_json_body, with_options, with_query, with_timeout, RequestOption};
pub use parks::{ParksOptions, ParksService};
pub use rate_limit::RateLimit;
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{
    Activity, Address, Contacts, EmailAddress, EntranceFee, EntrancePass, Exception, Hours, Image, Multimedia,
    OperatingHours, Park, Parks, PhoneNumber, Topic,
};
