//! Employee model.
//!
//! The engine only needs an employee's identity and the balance they carried
//! into the system; roles and credentials belong to external collaborators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents an employee whose hours are accounted for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Three-digit personal number used on rosters.
    #[serde(default)]
    pub personal_number: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Hour balance carried in before the first recorded shift.
    #[serde(default)]
    pub initial_balance: Decimal,
}

impl Employee {
    /// Creates an employee with a zero initial balance.
    ///
    /// # Examples
    ///
    /// ```
    /// use worktrack_engine::models::Employee;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee::new("emp_001", "Jana Novakova");
    /// assert_eq!(employee.initial_balance, Decimal::ZERO);
    /// ```
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            personal_number: None,
            name: name.into(),
            initial_balance: Decimal::ZERO,
        }
    }

    /// Sets the initial balance.
    pub fn with_initial_balance(mut self, balance: Decimal) -> Self {
        self.initial_balance = balance;
        self
    }
}
