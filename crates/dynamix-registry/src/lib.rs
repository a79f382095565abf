//! Processor registry and host abstraction for dynamix.
//!
//! - [`ProcessorRegistry`] maps IDs to processor constructors. The four
//!   flavours are always present; presets and custom constructors can be
//!   added.
//! - [`NativeHost`] is the slot-based capability a bridge or plugin host
//!   calls through. [`InProcessHost`] implements it by calling processors
//!   directly. [`FakeHost`] records calls for tests of host-driving code.
//!
//! Nothing here is global: the owner of the processing graph builds a
//! registry and lends it to the hosts it creates.
//!
//! # Example
//!
//! ```rust
//! use dynamix_registry::{InProcessHost, NativeHost, ProcessorRegistry, SlotId};
//!
//! let registry = ProcessorRegistry::with_factory_presets();
//! let mut host = InProcessHost::new(&registry);
//! host.load(SlotId(0), "vocal-radio", 48000.0, 2)?;
//! host.set_parameter(SlotId(0), "threshold", -22.0)?;
//!
//! let left = vec![0.1f32; 512];
//! let right = vec![0.1f32; 512];
//! let mut out_l = vec![0.0f32; 512];
//! let mut out_r = vec![0.0f32; 512];
//! host.process(SlotId(0), &[&left[..], &right[..]], &mut [&mut out_l[..], &mut out_r[..]])?;
//! # Ok::<(), dynamix_registry::HostError>(())
//! ```

pub mod error;
pub mod fake;
pub mod host;
pub mod registry;

pub use error::{HostError, RegistryError};
pub use fake::{FakeHost, HostCall};
pub use host::{InProcessHost, NativeHost, SlotId};
pub use registry::{ProcessorDescriptor, ProcessorFactory, ProcessorRegistry};
