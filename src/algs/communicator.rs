//! Thin façade over serial, intra-process (threads) or inter-process (MPI) message passing.
//!
//! Messages are *contiguous byte slices* (no zero-copy guarantees).
//! All handles are **waitable** but non-blocking: callers must `.wait()` before
//! they trust that a receive buffer is filled.
//!
//! The only collective the discretization needs is [`Communicator::allgather`],
//! used while building a [`BlockMap`](crate::data::block_map::BlockMap) to learn
//! global sizes. Backends may override it with a native collective.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};

use crate::disc_error::{CommFailure, DiscretizationError};

/// Tag reserved for the default [`Communicator::allgather`] implementation.
pub const ALLGATHER_TAG: u16 = 0xA11C;

/// Non-blocking point-to-point messaging plus the one collective maps need.
pub trait Communicator {
    /// Handle returned by `isend`.
    type SendHandle: Wait;
    /// Handle returned by `irecv`.
    type RecvHandle: Wait;

    /// Rank of this process in the communicator.
    fn rank(&self) -> usize;
    /// Number of ranks in the communicator.
    fn size(&self) -> usize;

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle;
    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle;

    /// Gather `send` from every rank into `recv`, ordered by rank.
    ///
    /// `recv.len()` must equal `send.len() * self.size()`, and every rank must
    /// contribute the same number of bytes.
    fn allgather(&self, send: &[u8], recv: &mut [u8]) -> Result<(), DiscretizationError> {
        let me = self.rank();
        let n = self.size().max(1);
        let chunk = send.len();
        if recv.len() != chunk * n {
            return Err(DiscretizationError::CommError {
                rank: me,
                source: format!(
                    "allgather receive buffer holds {} bytes, need {}",
                    recv.len(),
                    chunk * n
                )
                .into(),
            });
        }
        recv[me * chunk..(me + 1) * chunk].copy_from_slice(send);
        if n == 1 {
            return Ok(());
        }

        let mut pending = Vec::with_capacity(n - 1);
        for peer in (0..n).filter(|&p| p != me) {
            let lo = peer * chunk;
            let h = self.irecv(peer, ALLGATHER_TAG, &mut recv[lo..lo + chunk]);
            pending.push((peer, h));
        }
        let sends: Vec<_> = (0..n)
            .filter(|&p| p != me)
            .map(|peer| self.isend(peer, ALLGATHER_TAG, send))
            .collect();

        let mut maybe_err = None;
        for (peer, h) in pending {
            match h.wait() {
                Some(data) if data.len() == chunk => {
                    let lo = peer * chunk;
                    recv[lo..lo + chunk].copy_from_slice(&data);
                }
                Some(data) if maybe_err.is_none() => {
                    maybe_err = Some(DiscretizationError::CommError {
                        rank: me,
                        source: format!(
                            "allgather from rank {peer}: expected {chunk} bytes, got {}",
                            data.len()
                        )
                        .into(),
                    });
                }
                None if maybe_err.is_none() => {
                    maybe_err = Some(DiscretizationError::CommError {
                        rank: me,
                        source: format!("allgather: nothing received from rank {peer}").into(),
                    });
                }
                _ => {}
            }
        }
        for s in sends {
            let _ = s.wait();
        }
        match maybe_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Returns true for the serial no-op backend.
    fn is_no_comm(&self) -> bool {
        false
    }
}

/// Anything that can be waited on.
pub trait Wait {
    /// Wait for completion and return the received data (if any).
    fn wait(self) -> Option<Vec<u8>>;
}

impl Wait for () {
    fn wait(self) -> Option<Vec<u8>> {
        None
    }
}

/// Single-rank communicator for serial runs and unit tests.
#[derive(Clone, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    type SendHandle = ();
    type RecvHandle = ();

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn isend(&self, _peer: usize, _tag: u16, _buf: &[u8]) {}
    fn irecv(&self, _peer: usize, _tag: u16, _buf: &mut [u8]) {}
    fn is_no_comm(&self) -> bool {
        true
    }
}

// --- ThreadComm: several ranks as threads of one process ---

type Key = (usize, usize, u16); // (src, dst, tag)

#[derive(Default)]
struct Mailbox {
    slots: DashMap<Key, Vec<Bytes>>,
    gate: Mutex<()>,
    posted: Condvar,
}

impl Mailbox {
    fn post(&self, key: Key, data: Bytes) {
        self.slots.entry(key).or_default().push(data);
        let _guard = self.gate.lock();
        self.posted.notify_all();
    }

    fn take(&self, key: &Key) -> Option<Bytes> {
        let mut queue = self.slots.get_mut(key)?;
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }
}

/// Receive handle for [`ThreadComm`]; blocks in `wait` until the message arrives
/// or the communicator's timeout expires.
pub struct LocalHandle {
    mailbox: Arc<Mailbox>,
    key: Key,
    len: usize,
    timeout: Duration,
}

impl Wait for LocalHandle {
    fn wait(self) -> Option<Vec<u8>> {
        let mut guard = self.mailbox.gate.lock();
        loop {
            if let Some(bytes) = self.mailbox.take(&self.key) {
                return Some(self.truncate(&bytes));
            }
            if self
                .mailbox
                .posted
                .wait_for(&mut guard, self.timeout)
                .timed_out()
            {
                return self.mailbox.take(&self.key).map(|b| self.truncate(&b));
            }
        }
    }
}

impl LocalHandle {
    fn truncate(&self, bytes: &Bytes) -> Vec<u8> {
        bytes[..self.len.min(bytes.len())].to_vec()
    }
}

/// In-process communicator: each rank runs on its own thread and all ranks
/// share one mailbox. Messages between a pair of ranks with the same tag are
/// delivered in send order.
#[derive(Clone)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    mailbox: Arc<Mailbox>,
    timeout: Duration,
}

impl ThreadComm {
    /// Default time a receive waits before reporting failure.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create `size` communicators sharing one mailbox, one per rank.
    pub fn world(size: usize) -> Vec<ThreadComm> {
        let mailbox = Arc::new(Mailbox::default());
        (0..size)
            .map(|rank| ThreadComm {
                rank,
                size,
                mailbox: Arc::clone(&mailbox),
                timeout: Self::DEFAULT_TIMEOUT,
            })
            .collect()
    }

    /// Override how long a receive waits for its message.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ThreadComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadComm")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .finish()
    }
}

impl Communicator for ThreadComm {
    type SendHandle = ();
    type RecvHandle = LocalHandle;

    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.size
    }

    fn isend(&self, peer: usize, tag: u16, buf: &[u8]) -> Self::SendHandle {
        self.mailbox
            .post((self.rank, peer, tag), Bytes::copy_from_slice(buf));
    }

    fn irecv(&self, peer: usize, tag: u16, buf: &mut [u8]) -> Self::RecvHandle {
        LocalHandle {
            mailbox: Arc::clone(&self.mailbox),
            key: (peer, self.rank, tag),
            len: buf.len(),
            timeout: self.timeout,
        }
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::*;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::{
        Communicator as _, CommunicatorCollectives as _, Destination as _, Source as _,
    };

    /// Communicator over `MPI_COMM_WORLD`. Owns the MPI environment; MPI is
    /// finalized when it is dropped.
    pub struct MpiComm {
        pub world: SimpleCommunicator,
        pub rank: usize,
        _universe: Universe,
    }

    impl MpiComm {
        /// Initialize MPI. Fails if MPI was already initialized.
        pub fn new() -> Result<Self, DiscretizationError> {
            let universe = mpi::initialize().ok_or_else(|| DiscretizationError::CommError {
                rank: 0,
                source: CommFailure::from("MPI initialization failed"),
            })?;
            let world = universe.world();
            let rank = world.rank() as usize;
            Ok(Self {
                world,
                rank,
                _universe: universe,
            })
        }
    }

    /// Deferred blocking receive, performed on `wait`.
    pub struct MpiRecv {
        peer: i32,
        tag: i32,
    }

    impl Wait for MpiRecv {
        fn wait(self) -> Option<Vec<u8>> {
            let (data, _status) = SimpleCommunicator::world()
                .process_at_rank(self.peer)
                .receive_vec_with_tag::<u8>(self.tag);
            Some(data)
        }
    }

    impl Communicator for MpiComm {
        type SendHandle = ();
        type RecvHandle = MpiRecv;

        fn rank(&self) -> usize {
            self.rank
        }
        fn size(&self) -> usize {
            self.world.size() as usize
        }

        fn isend(&self, peer: usize, tag: u16, buf: &[u8]) {
            self.world
                .process_at_rank(peer as i32)
                .send_with_tag(buf, i32::from(tag));
        }

        fn irecv(&self, peer: usize, tag: u16, _buf: &mut [u8]) -> MpiRecv {
            MpiRecv {
                peer: peer as i32,
                tag: i32::from(tag),
            }
        }

        fn allgather(&self, send: &[u8], recv: &mut [u8]) -> Result<(), DiscretizationError> {
            if recv.len() != send.len() * self.size() {
                return Err(DiscretizationError::CommError {
                    rank: self.rank,
                    source: format!(
                        "allgather receive buffer holds {} bytes, need {}",
                        recv.len(),
                        send.len() * self.size()
                    )
                    .into(),
                });
            }
            self.world.all_gather_into(send, recv);
            Ok(())
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;
