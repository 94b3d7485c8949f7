//! Line-oriented TCP sessions: every line a client sends becomes a block
//! payload, and every published chain snapshot is written back to every
//! connected client.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::blockchain::store::ChainSnapshot;
use crate::blockchain::{ChainStore, Miner, Submission};

pub const FIRST_PROMPT: &str = "Enter Data:";
pub const NEXT_PROMPT: &str = "\nEnter Data:";

/// Accept sessions until the listener fails. Per-session errors are logged
/// and never end the loop.
pub async fn serve(
    listener: TcpListener,
    store: Arc<ChainStore>,
    miner: Arc<Miner>,
) -> io::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        info!("session opened: {peer}");

        let store = Arc::clone(&store);
        let miner = Arc::clone(&miner);
        tokio::spawn(async move {
            match handle_session(socket, peer, store, miner).await {
                Ok(()) => info!("session closed: {peer}"),
                Err(e) => warn!("session {peer} ended with error: {e}"),
            }
        });
    }
}

async fn handle_session(
    socket: TcpStream,
    peer: SocketAddr,
    store: Arc<ChainStore>,
    miner: Arc<Miner>,
) -> io::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();
    let mut snapshots = store.subscribe();

    writer.write_all(FIRST_PROMPT.as_bytes()).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(payload) = line? else {
                    return Ok(());
                };
                submit(&store, &miner, peer, payload).await;
                // the block this line produced is already queued; echo it
                // before prompting again
                if !drain(&mut snapshots, &mut writer, peer).await? {
                    return Ok(());
                }
                writer.write_all(NEXT_PROMPT.as_bytes()).await?;
            }
            snapshot = snapshots.recv() => match snapshot {
                Ok(chain) => write_chain(&mut writer, &chain).await?,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("session {peer} skipped {skipped} chain snapshots");
                }
                Err(RecvError::Closed) => return Ok(()),
            },
        }
    }
}

/// Write every snapshot already queued for this session. Returns `false`
/// once the store is gone.
async fn drain(
    snapshots: &mut Receiver<ChainSnapshot>,
    writer: &mut OwnedWriteHalf,
    peer: SocketAddr,
) -> io::Result<bool> {
    loop {
        match snapshots.try_recv() {
            Ok(chain) => write_chain(writer, &chain).await?,
            Err(TryRecvError::Lagged(skipped)) => {
                warn!("session {peer} skipped {skipped} chain snapshots");
            }
            Err(TryRecvError::Empty) => return Ok(true),
            Err(TryRecvError::Closed) => return Ok(false),
        }
    }
}

async fn write_chain(writer: &mut OwnedWriteHalf, chain: &ChainSnapshot) -> io::Result<()> {
    let mut doc = serde_json::to_string_pretty(chain.as_slice())?;
    doc.push('\n');
    writer.write_all(doc.as_bytes()).await
}

/// Run one mine+append step off the async workers. A client hanging up
/// does not interrupt the search.
async fn submit(store: &Arc<ChainStore>, miner: &Arc<Miner>, peer: SocketAddr, payload: String) {
    let store = Arc::clone(store);
    let miner = Arc::clone(miner);
    let outcome = tokio::task::spawn_blocking(move || store.submit(&miner, &payload)).await;

    match outcome {
        Ok(Ok(Submission::Appended(block))) => {
            info!("session {peer} added block #{}", block.index);
        }
        Ok(Ok(Submission::Rejected(reason))) => {
            warn!("session {peer} block rejected: {reason}");
        }
        Ok(Err(e)) => warn!("session {peer} submission failed: {e}"),
        Err(e) => error!("session {peer} mining task panicked: {e}"),
    }
}
