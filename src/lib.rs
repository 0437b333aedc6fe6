//! Workspace-level integration tests for bytepool and bytebuf live in `tests/`.
