// Application layer: concrete sources behind the domain ports.

pub mod fetchers;
