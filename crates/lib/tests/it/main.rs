/*! Integration tests for bitweave.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - block: Tests for the block combinators driven through full contexts
 * - context: Tests for context state layering and rollback fidelity
 * - path: Tests for the logical path algebra
 * - scenarios: End-to-end decode/encode scenarios over small formats
 * - store: Tests for the transactional stores, including randomized runs
 * - stream: Tests for bit streams and the deferred writers
 * - transaction: Tests for transaction handle composition
 */

mod block;
mod context;
mod helpers;
mod path;
mod scenarios;
mod store;
mod transaction;
