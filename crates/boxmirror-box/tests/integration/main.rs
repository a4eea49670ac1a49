//! Integration tests for boxmirror-box
//!
//! Uses wiremock to simulate the Box Content API and verifies
//! end-to-end behavior of folder listings, content streaming,
//! unlocking, and error classification.

mod common;

mod test_content;
mod test_listing;
