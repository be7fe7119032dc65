use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::notifications::{EmailProvider, SmsProvider};
use crate::services::payments::PaymentGateway;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub payments: Box<dyn PaymentGateway>,
    pub email: Box<dyn EmailProvider>,
    pub sms: Box<dyn SmsProvider>,
}
