pub mod category;
pub mod clock;
pub mod distance;
pub mod error;
pub mod hash;
pub mod money;
pub mod period;
pub mod receipt;
pub mod store;
pub mod trip;

pub use category::{CategoryDef, CategoryKey, CategoryRegistry, Language, RegistryError};
pub use clock::{Clock, FixedClock, SystemClock};
pub use distance::{Kilometres, KM_PER_MILE};
pub use error::ValidationError;
pub use money::Money;
pub use period::{month_from_name, RetentionPolicy, TaxYear};
pub use receipt::{AuditStatus, Expense, ExpenseReceipt, ReceiptMetadata};
pub use store::{MemoryStore, ReceiptStore, StoreError, TripStore};
pub use trip::{MileageLog, Trip, TripKind};
