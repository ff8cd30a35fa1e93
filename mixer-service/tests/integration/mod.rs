//! End-to-end rounds over loopback TCP.

#[allow(unused_imports)]
use crate::harness::*;

mod e2e_rejection;
mod e2e_timeout;
