//! Unit tests for version graphs and path resolution.
