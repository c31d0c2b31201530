use std::{
    collections::HashMap,
    fmt,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use redis::{Client, Cmd, Connection, FromRedisValue, RedisError};

use crate::storage::{BackendError, KeyValueStore, ScanPage, store::KEY_PREFIX};

/// Hint passed to `SCAN` for how many keys to examine per call.
const SCAN_COUNT: usize = 100;

/// Upper bound on opening a TCP connection to the server.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on a single socket read or write.
const IO_TIMEOUT: Duration = Duration::from_secs(5);

impl From<RedisError> for BackendError {
    fn from(error: RedisError) -> Self {
        Self::new(error)
    }
}

/// A [`KeyValueStore`] backed by a Valkey (or Redis) server.
///
/// Commands share one connection. If the connection breaks or times out it is
/// discarded, and the command is retried once on a fresh connection.
pub struct ValkeyClient {
    address: String,
    client: Client,
    connection: Mutex<Option<Connection>>,
}

impl fmt::Debug for ValkeyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValkeyClient")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl ValkeyClient {
    /// Connects to the server at `host:port` and verifies the connection with
    /// a `PING`.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the host is empty, the connection cannot
    /// be opened in time, or the server does not answer `PONG`.
    pub fn connect(host: &str, port: u16) -> Result<Self, BackendError> {
        if host.is_empty() {
            return Err(BackendError::new("host cannot be empty"));
        }

        let address = format!("redis://{host}:{port}/");
        let client = Client::open(address.as_str())?;
        let connection = open(&client)?;
        let valkey = Self {
            address,
            client,
            connection: Mutex::new(Some(connection)),
        };
        valkey.ping()?;

        tracing::debug!(address = %valkey.address, "connected to valkey");
        Ok(valkey)
    }

    /// Checks that the server is responsive.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the command fails or the reply is not
    /// `PONG`.
    pub fn ping(&self) -> Result<(), BackendError> {
        let reply: String = self.query(&redis::cmd("PING"))?;
        if reply != "PONG" {
            return Err(BackendError::new(format!("unexpected ping response: {reply}")));
        }
        Ok(())
    }

    /// Runs `cmd`, reconnecting once if the current connection is lost.
    fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> Result<T, BackendError> {
        let mut slot = self.lock()?;
        match self.query_on(&mut slot, cmd) {
            Err(error) if is_connection_lost(&error) => {
                tracing::warn!(
                    address = %self.address,
                    %error,
                    "valkey connection lost, reconnecting"
                );
                *slot = None;
                self.query_on(&mut slot, cmd).map_err(|error| {
                    if is_connection_lost(&error) {
                        *slot = None;
                    }
                    BackendError::from(error)
                })
            }
            result => Ok(result?),
        }
    }

    fn query_on<T: FromRedisValue>(
        &self,
        slot: &mut Option<Connection>,
        cmd: &Cmd,
    ) -> Result<T, RedisError> {
        if slot.is_none() {
            *slot = Some(open(&self.client)?);
            tracing::debug!(address = %self.address, "reopened valkey connection");
        }
        match slot.as_mut() {
            Some(connection) => cmd.query(connection),
            None => Err(RedisError::from((
                redis::ErrorKind::ClientError,
                "no valkey connection",
            ))),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>, BackendError> {
        self.connection
            .lock()
            .map_err(|_| BackendError::new("valkey connection lock poisoned"))
    }
}

/// Opens a connection with bounded connect and socket timeouts.
fn open(client: &Client) -> Result<Connection, RedisError> {
    let connection = client.get_connection_with_timeout(CONNECT_TIMEOUT)?;
    connection.set_read_timeout(Some(IO_TIMEOUT))?;
    connection.set_write_timeout(Some(IO_TIMEOUT))?;
    Ok(connection)
}

/// Whether `error` leaves the connection unusable. A timed-out reply may still
/// arrive later, so timeouts count too.
fn is_connection_lost(error: &RedisError) -> bool {
    error.is_connection_dropped() || error.is_io_error() || error.is_timeout()
}

impl KeyValueStore for ValkeyClient {
    fn exists(&self, keys: &[String]) -> Result<u64, BackendError> {
        self.query(redis::cmd("EXISTS").arg(keys))
    }

    fn set_fields(&self, key: &str, fields: &[(&str, String)]) -> Result<(), BackendError> {
        let mut cmd = redis::cmd("HSET");
        cmd.arg(key);
        for (field, value) in fields {
            cmd.arg(*field).arg(value);
        }
        let _written: u64 = self.query(&cmd)?;
        Ok(())
    }

    fn get_all_fields(&self, key: &str) -> Result<HashMap<String, String>, BackendError> {
        self.query(redis::cmd("HGETALL").arg(key))
    }

    fn delete(&self, keys: &[String]) -> Result<u64, BackendError> {
        self.query(redis::cmd("DEL").arg(keys))
    }

    fn scan(&self, cursor: u64) -> Result<ScanPage, BackendError> {
        let (next, keys): (u64, Vec<String>) = self.query(
            redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(format!("{KEY_PREFIX}*"))
                .arg("COUNT")
                .arg(SCAN_COUNT),
        )?;

        Ok(ScanPage {
            keys,
            next: (next != 0).then_some(next),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{io, net::TcpListener};

    use test_case::test_case;

    use super::*;

    #[test_case(io::ErrorKind::BrokenPipe; "broken pipe")]
    #[test_case(io::ErrorKind::ConnectionReset; "connection reset")]
    #[test_case(io::ErrorKind::TimedOut; "timed out")]
    #[test_case(io::ErrorKind::WouldBlock; "read timeout")]
    fn io_failures_drop_the_connection(kind: io::ErrorKind) {
        let error = RedisError::from(io::Error::new(kind, "socket failure"));
        assert!(is_connection_lost(&error));
    }

    #[test]
    fn reply_errors_keep_the_connection() {
        let error = RedisError::from((redis::ErrorKind::TypeError, "unexpected reply"));
        assert!(!is_connection_lost(&error));
    }

    #[test]
    fn empty_host_is_rejected() {
        let error = ValkeyClient::connect("", 6379).unwrap_err();
        assert_eq!(error.to_string(), "host cannot be empty");
    }

    #[test]
    fn unreachable_server_fails_to_connect() {
        // Bind then drop a listener to get a port nothing is listening on.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        assert!(ValkeyClient::connect("127.0.0.1", port).is_err());
    }
}
