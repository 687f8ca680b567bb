//! HTTP front end.
//!
//! # API Endpoints
//!
//! ## `/` (GET)
//!
//!   Returns HTTP 200 (OK) and the body `Welcome. You got served.`.
//!
//! ## `/file/{path}` (GET/HEAD)
//!
//!   Streams the file `{path}` from the configured root directory. `Content-Type` is sniffed
//!   from the first 512 bytes of the file and `Content-Length` is the file's size.
//!
//!   Returns HTTP 404 (Not Found) if the file can't be opened, or if `{path}` starts with `.`
//!   and the server wasn't started with `--dotfiles`.
//!
//! ## `/dyn/{path}` (POST)
//!
//!   Creates a dynamic endpoint at the request path holding the request body. `{path}` may be
//!   empty, so `/dyn/` itself is a valid endpoint. For example:
//!
//!   ```bash
//!   ❯ curl -X POST --data-binary @report.json http://localhost:8000/dyn/report.json
//!   ```
//!
//!   Returns HTTP 200 (OK) with an empty body. Returns HTTP 405 (Method Not Allowed) if the
//!   path already has a dynamic endpoint, leaving it unchanged, and HTTP 500 if a backing
//!   store can't be allocated.
//!
//! ## `/dyn/{path}` (GET/HEAD)
//!
//!   Returns the content of an existing dynamic endpoint. The `Content-Type` comes from the
//!   path's extension: `html`, `json`, `xml` and `pdf` are recognized, anything else is
//!   `text/plain`. Paths without a dynamic endpoint get the same HTTP 404 (Not Found) as any
//!   unknown route.
//!
//! ## `/dyn/{path}` (PUT)
//!
//!   Replaces the content of an existing dynamic endpoint. Returns HTTP 200 (OK) with an empty
//!   body, or HTTP 404 (Not Found) for paths without a dynamic endpoint.
//!
//! ## `/echo*` (POST/PUT/PATCH)
//!
//!   Any path starting with `/echo` parses the request body as JSON and returns it indented:
//!
//!   ```bash
//!   ❯ curl --data '{"a":1}' http://localhost:8000/echo
//!   {
//!     "a": 1
//!   }
//!   ```
//!
//!   Returns HTTP 400 (Bad Request) if the body can't be read or isn't valid JSON.
//!
//! ## Anything else
//!
//!   Returns HTTP 404 (Not Found) and the body `404 File Not Found!`.

mod api_error;
mod routes;
pub mod server;

pub use server::{app, new};
