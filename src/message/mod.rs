//! PD message representation: headers, data objects, buffers, and the
//! shared buffer pool.
//!
//! Grounded on `lib/include/pdb_msg.h` (the `union pd_msg` wire layout) and
//! `src/device_policy_manager.c` (PDO/RDO unit scaling and builder shapes),
//! reworked from a C union with cached accessor macros into small typed
//! views built with `proc-bitfield`, per §3 of the design notes.

pub mod buffer;
pub mod header;
pub mod pdo;
pub mod pool;
pub mod rdo;

pub use buffer::{MessageBuffer, MAX_MESSAGE_LEN};
pub use header::{ControlMessageType, DataMessageType, DataRole, Header, MessageType, PowerRole, SpecRevision};
pub use pdo::{FixedSupplyPdo, MilliAmps, MilliVolts, PowerDataObject, PpsApdo};
pub use pool::Pool;
pub use rdo::{FixedVariableRdo, ProgrammableRdo, RequestDataObject};
