use tokio::net::ToSocketAddrs;

use crate::cmd::Command;
use crate::connection::Connection;
use crate::frame::Reply;
use crate::Result;

/// A Redis client owning exactly one [`Connection`] for its lifetime.
///
/// Every command runs a full `encode → write → read one reply → project`
/// cycle before the next may begin; executors take `&mut self`, so the
/// one-outstanding-request rule is enforced by the borrow checker rather
/// than by documentation. Wrap the client in a mutex (or hand it to a
/// single task) to share it across tasks.
///
/// ```no_run
/// use redlink::client::Client;
///
/// # async fn run() -> redlink::Result<()> {
/// let mut client = Client::connect("127.0.0.1:6379").await?;
/// client.set("greeting", "hello").await?;
/// let value = client.get("greeting").await?;
/// client.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    connection: Connection,
}

impl Client {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Client> {
        let connection = Connection::connect(addr).await?;
        Ok(Client { connection })
    }

    pub fn new(connection: Connection) -> Client {
        Client { connection }
    }

    pub async fn close(self) -> Result<()> {
        self.connection.close().await
    }

    /// Runs `command` and returns the raw reply, for commands this client
    /// has no typed wrapper for. The caller projects it.
    pub async fn execute(&mut self, command: Command) -> Result<Reply> {
        self.connection.write_command(&command).await?;
        self.connection.read_reply().await
    }

    /// Like [`execute`](Client::execute), but requires an array reply and
    /// returns its raw elements, each of any kind (nulls and nested arrays
    /// included).
    pub async fn execute_array(&mut self, command: Command) -> Result<Vec<Reply>> {
        self.execute(command).await?.into_array()
    }

    async fn execute_string(&mut self, command: Command) -> Result<String> {
        self.execute(command).await?.into_string()
    }

    async fn execute_bool(&mut self, command: Command) -> Result<bool> {
        self.execute(command).await?.into_bool()
    }

    async fn execute_int(&mut self, command: Command) -> Result<i64> {
        self.execute(command).await?.into_int()
    }

    async fn execute_string_array(&mut self, command: Command) -> Result<Vec<String>> {
        self.execute(command).await?.into_string_array()
    }

    // Key commands

    /// Get the value of `key`. An absent key is `Error::NotFound`, not an
    /// empty string.
    ///
    /// Ref: <https://redis.io/docs/latest/commands/get/>
    pub async fn get(&mut self, key: &str) -> Result<String> {
        self.execute_string(Command::new("GET").arg(key)).await
    }

    /// Set `key` to `value`.
    ///
    /// Ref: <https://redis.io/docs/latest/commands/set/>
    pub async fn set(&mut self, key: &str, value: &str) -> Result<String> {
        self.execute_string(Command::new("SET").arg(key).arg(value))
            .await
    }

    pub async fn ping(&mut self) -> Result<String> {
        self.execute_string(Command::new("PING")).await
    }

    pub async fn del(&mut self, keys: &[&str]) -> Result<String> {
        self.execute_string(Command::new("DEL").args(keys.iter().copied()))
            .await
    }

    pub async fn exists(&mut self, key: &str) -> Result<bool> {
        self.execute_bool(Command::new("EXISTS").arg(key)).await
    }

    pub async fn expire(&mut self, key: &str, seconds: i64) -> Result<String> {
        self.execute_string(Command::new("EXPIRE").arg(key).arg(seconds.to_string()))
            .await
    }

    pub async fn expire_at(&mut self, key: &str, unix_time: i64) -> Result<String> {
        self.execute_string(Command::new("EXPIREAT").arg(key).arg(unix_time.to_string()))
            .await
    }

    pub async fn ttl(&mut self, key: &str) -> Result<i64> {
        self.execute_int(Command::new("TTL").arg(key)).await
    }

    pub async fn keys(&mut self, pattern: &str) -> Result<Vec<String>> {
        self.execute_string_array(Command::new("KEYS").arg(pattern))
            .await
    }

    pub async fn move_(&mut self, key: &str, db: i64) -> Result<bool> {
        self.execute_bool(Command::new("MOVE").arg(key).arg(db.to_string()))
            .await
    }

    pub async fn persist(&mut self, key: &str) -> Result<bool> {
        self.execute_bool(Command::new("PERSIST").arg(key)).await
    }

    pub async fn pexpire(&mut self, key: &str, milliseconds: i64) -> Result<bool> {
        self.execute_bool(Command::new("PEXPIRE").arg(key).arg(milliseconds.to_string()))
            .await
    }

    pub async fn pexpire_at(&mut self, key: &str, milliseconds_timestamp: i64) -> Result<bool> {
        self.execute_bool(
            Command::new("PEXPIREAT")
                .arg(key)
                .arg(milliseconds_timestamp.to_string()),
        )
        .await
    }

    pub async fn pttl(&mut self, key: &str) -> Result<i64> {
        self.execute_int(Command::new("PTTL").arg(key)).await
    }

    pub async fn random_key(&mut self) -> Result<String> {
        self.execute_string(Command::new("RANDOMKEY")).await
    }

    pub async fn rename(&mut self, key: &str, new_key: &str) -> Result<String> {
        self.execute_string(Command::new("RENAME").arg(key).arg(new_key))
            .await
    }

    pub async fn rename_nx(&mut self, key: &str, new_key: &str) -> Result<String> {
        self.execute_string(Command::new("RENAMENX").arg(key).arg(new_key))
            .await
    }

    pub async fn type_(&mut self, key: &str) -> Result<String> {
        self.execute_string(Command::new("TYPE").arg(key)).await
    }

    pub async fn append(&mut self, key: &str, value: &str) -> Result<i64> {
        self.execute_int(Command::new("APPEND").arg(key).arg(value))
            .await
    }

    pub async fn strlen(&mut self, key: &str) -> Result<i64> {
        self.execute_int(Command::new("STRLEN").arg(key)).await
    }

    pub async fn incr(&mut self, key: &str) -> Result<i64> {
        self.execute_int(Command::new("INCR").arg(key)).await
    }

    pub async fn decr(&mut self, key: &str) -> Result<i64> {
        self.execute_int(Command::new("DECR").arg(key)).await
    }

    // List commands

    pub async fn lpush(&mut self, key: &str, value: &str) -> Result<i64> {
        self.execute_int(Command::new("LPUSH").arg(key).arg(value))
            .await
    }

    pub async fn lpushx(&mut self, key: &str, value: &str) -> Result<i64> {
        self.execute_int(Command::new("LPUSHX").arg(key).arg(value))
            .await
    }

    pub async fn rpush(&mut self, key: &str, value: &str) -> Result<i64> {
        self.execute_int(Command::new("RPUSH").arg(key).arg(value))
            .await
    }

    pub async fn rpushx(&mut self, key: &str, value: &str) -> Result<i64> {
        self.execute_int(Command::new("RPUSHX").arg(key).arg(value))
            .await
    }

    pub async fn lpop(&mut self, key: &str) -> Result<String> {
        self.execute_string(Command::new("LPOP").arg(key)).await
    }

    pub async fn rpop(&mut self, key: &str) -> Result<String> {
        self.execute_string(Command::new("RPOP").arg(key)).await
    }

    pub async fn blpop(&mut self, keys: &[&str], timeout: i64) -> Result<Vec<String>> {
        self.execute_string_array(
            Command::new("BLPOP")
                .args(keys.iter().copied())
                .arg(timeout.to_string()),
        )
        .await
    }

    pub async fn brpop(&mut self, keys: &[&str], timeout: i64) -> Result<Vec<String>> {
        self.execute_string_array(
            Command::new("BRPOP")
                .args(keys.iter().copied())
                .arg(timeout.to_string()),
        )
        .await
    }

    pub async fn lrange(&mut self, key: &str, from: i64, to: i64) -> Result<Vec<String>> {
        self.execute_string_array(
            Command::new("LRANGE")
                .arg(key)
                .arg(from.to_string())
                .arg(to.to_string()),
        )
        .await
    }

    pub async fn llen(&mut self, key: &str) -> Result<i64> {
        self.execute_int(Command::new("LLEN").arg(key)).await
    }

    pub async fn lindex(&mut self, key: &str, index: i64) -> Result<String> {
        self.execute_string(Command::new("LINDEX").arg(key).arg(index.to_string()))
            .await
    }

    pub async fn lrem(&mut self, key: &str, count: i64, value: &str) -> Result<i64> {
        self.execute_int(
            Command::new("LREM")
                .arg(key)
                .arg(count.to_string())
                .arg(value),
        )
        .await
    }

    pub async fn lset(&mut self, key: &str, index: i64, value: &str) -> Result<String> {
        self.execute_string(
            Command::new("LSET")
                .arg(key)
                .arg(index.to_string())
                .arg(value),
        )
        .await
    }

    pub async fn ltrim(&mut self, key: &str, from: i64, to: i64) -> Result<String> {
        self.execute_string(
            Command::new("LTRIM")
                .arg(key)
                .arg(from.to_string())
                .arg(to.to_string()),
        )
        .await
    }

    // Set commands

    pub async fn sadd(&mut self, set: &str, member: &str) -> Result<i64> {
        self.execute_int(Command::new("SADD").arg(set).arg(member))
            .await
    }

    pub async fn smembers(&mut self, set: &str) -> Result<Vec<String>> {
        self.execute_string_array(Command::new("SMEMBERS").arg(set))
            .await
    }

    pub async fn scard(&mut self, set: &str) -> Result<i64> {
        self.execute_int(Command::new("SCARD").arg(set)).await
    }

    pub async fn sdiff(&mut self, sets: &[&str]) -> Result<Vec<String>> {
        self.execute_string_array(Command::new("SDIFF").args(sets.iter().copied()))
            .await
    }

    pub async fn sdiff_store(&mut self, dest: &str, left: &str, right: &str) -> Result<i64> {
        self.execute_int(Command::new("SDIFFSTORE").arg(dest).arg(left).arg(right))
            .await
    }

    pub async fn sinter(&mut self, sets: &[&str]) -> Result<Vec<String>> {
        self.execute_string_array(Command::new("SINTER").args(sets.iter().copied()))
            .await
    }

    pub async fn sinter_store(&mut self, dest: &str, left: &str, right: &str) -> Result<i64> {
        self.execute_int(Command::new("SINTERSTORE").arg(dest).arg(left).arg(right))
            .await
    }

    pub async fn sismember(&mut self, set: &str, member: &str) -> Result<bool> {
        self.execute_bool(Command::new("SISMEMBER").arg(set).arg(member))
            .await
    }

    pub async fn smove(&mut self, source: &str, dest: &str, member: &str) -> Result<bool> {
        self.execute_bool(Command::new("SMOVE").arg(source).arg(dest).arg(member))
            .await
    }

    pub async fn spop(&mut self, set: &str) -> Result<String> {
        self.execute_string(Command::new("SPOP").arg(set)).await
    }

    pub async fn srand_member(&mut self, set: &str) -> Result<String> {
        self.execute_string(Command::new("SRANDMEMBER").arg(set))
            .await
    }

    pub async fn srand_member_n(&mut self, set: &str, count: i64) -> Result<Vec<String>> {
        self.execute_string_array(Command::new("SRANDMEMBER").arg(set).arg(count.to_string()))
            .await
    }

    pub async fn srem(&mut self, set: &str, member: &str) -> Result<i64> {
        self.execute_int(Command::new("SREM").arg(set).arg(member))
            .await
    }

    pub async fn sunion(&mut self, sets: &[&str]) -> Result<Vec<String>> {
        self.execute_string_array(Command::new("SUNION").args(sets.iter().copied()))
            .await
    }

    pub async fn sunion_store(&mut self, dest: &str, left: &str, right: &str) -> Result<i64> {
        self.execute_int(Command::new("SUNIONSTORE").arg(dest).arg(left).arg(right))
            .await
    }

    // Escape hatches for commands without a typed wrapper. The caller
    // handles the reply on their own: match on the kinds, mind the nulls.

    pub async fn run_command(&mut self, name: &str, args: &[&str]) -> Result<Reply> {
        self.execute(Command::new(name).args(args.iter().copied()))
            .await
    }

    pub async fn run_array_command(&mut self, name: &str, args: &[&str]) -> Result<Vec<Reply>> {
        self.execute_array(Command::new(name).args(args.iter().copied()))
            .await
    }
}
