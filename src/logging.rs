use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.  `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool) {
	let default = if verbose {
		"meta_sender=debug"
	} else {
		"meta_sender=info"
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

	// A second install (tests, embedding) is not an error worth reporting.
	let _ = fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.try_init();
}
