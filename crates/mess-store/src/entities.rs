//! Per-type store bindings: each persisted record declares its entity name
//! and key derivation here.

use mess_schemas::{GuestPayment, MessSettings, MonthlyDue, Student};

use crate::KeyedRecord;

/// Separator for composite keys. Plain ids never contain it by construction
/// (emails and uuids), so composite keys cannot collide with them.
pub const KEY_SEPARATOR: char = ':';

/// The composite `studentId:YYYY-MM` key of a monthly due.
pub fn monthly_due_key(student_id: &str, month: &str) -> String {
    format!("{student_id}{KEY_SEPARATOR}{month}")
}

impl KeyedRecord for Student {
    const ENTITY: &'static str = "student";

    fn key(&self) -> String {
        self.id.clone()
    }
}

impl KeyedRecord for MessSettings {
    const ENTITY: &'static str = "settings";

    fn key(&self) -> String {
        self.id.clone()
    }
}

impl KeyedRecord for MonthlyDue {
    const ENTITY: &'static str = "monthly_due";

    fn key(&self) -> String {
        monthly_due_key(&self.student_id, &self.month)
    }
}

impl KeyedRecord for GuestPayment {
    const ENTITY: &'static str = "guest_payment";

    fn key(&self) -> String {
        self.id.to_string()
    }
}
