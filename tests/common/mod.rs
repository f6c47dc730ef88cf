#![allow(dead_code)]

use std::error::Error;

pub use shellpipe_test_utils::fixtures::{echo, false_cmd, sh, sh_in, sleep, true_cmd};
pub use shellpipe_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn Error>>;
