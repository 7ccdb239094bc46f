#![doc(hidden)]

//! A proof-of-concept for the basic use case, mocking the seeder/leecher parts.

use std::io;
use std::num::NonZeroUsize;

use merkle::{determine_block_size, DefaultHasher, Hasher, PieceTable, StreamHasher, Tree};


const PAYLOAD_LENGTH: usize = 80 * 1024;

/// Deterministic stand-in for shared content.
fn payload() -> Vec<u8> {
    (0..PAYLOAD_LENGTH).map(|index| (index % 251) as u8).collect()
}

/// The metadata a seeder announces: enough for a leecher to verify every block on its
/// own, and the reassembled payload as a whole.
struct Announce {
    piece_table: PieceTable,
    checksum: <DefaultHasher as Hasher>::Hash,
    length: usize,
}

struct Seeder {
    payload: Vec<u8>,
}

impl Seeder {
    fn block_length(&self) -> Result<NonZeroUsize, &'static str> {
        determine_block_size(self.payload.len()).map_err(|_| "payload does not split into blocks...")
    }

    async fn announce(&self) -> Result<Announce, &'static str> {
        let mut hasher = StreamHasher::<DefaultHasher>::new(self.block_length()?);
        io::copy(&mut self.payload.as_slice(), &mut hasher).map_err(|_| "hashing the payload failed...")?;

        let checksum = hasher.sum(&[]).await.map_err(|_| "no checksum over an empty payload...")?;

        println!("Announcing {} bytes as {} blocks (root checksum: {checksum:x})", self.payload.len(), hasher.tree().len());

        Ok(Announce {
            piece_table: hasher.tree().piece_table(),
            checksum,
            length: self.payload.len(),
        })
    }

    async fn block(&self, index: usize) -> Result<&[u8], &'static str> {
        let block_length = self.block_length()?;
        self.payload.chunks(block_length.get()).nth(index).ok_or("block not found...")
    }

    fn alter_block(&mut self, index: usize) {
        if let Ok(block_length) = self.block_length() {
            if let Some(byte) = self.payload.get_mut(index * block_length.get()) {
                *byte ^= 0xff;
                println!("Oh noes, block #{index} got flipped on the wire!!!");
            }
        }
    }
}

struct Leecher {
    announce: Announce,
}

impl Leecher {
    async fn fetch(&self, seeder: &Seeder) -> Result<Vec<u8>, &'static str> {
        let table = &self.announce.piece_table;
        let output_size = <DefaultHasher as Hasher>::output_size();

        let mut payload = Vec::with_capacity(self.announce.length);
        for (index, piece) in table.pieces.chunks(output_size).enumerate() {
            let block = seeder.block(index).await?;
            let checksum = <DefaultHasher as Hasher>::checksum(block).map_err(|_| "hashing a block failed...")?;

            if checksum[..] != *piece {
                println!("Block #{index} does not match its piece digest, dropping it");
                return Err("a block failed verification!");
            }

            payload.extend_from_slice(block);
        }

        // cross-check the reassembled payload against the announced root checksum
        let tree = Tree::<DefaultHasher>::from_pieces(table).map_err(|_| "malformed piece table...")?;
        let root = tree.root().ok_or("empty piece table...")?;
        let checksum = root.checksum().await.map_err(|_| "payload checksum failed...")?;

        match checksum == self.announce.checksum {
            true => Ok(payload),
            false => Err("payload root does not match the announce!"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), &'static str> {
    const ALTERED_INDEX: usize = 2;

    tracing_subscriber::fmt::init();

    let mut seeder = Seeder { payload: payload() };

    println!("Seeding the payload...");
    let announce = seeder.announce().await?;
    let document = serde_json::to_string(&announce.piece_table).map_err(|_| "piece table does not serialize...")?;
    println!("Piece table document: {document}");

    let leecher = Leecher { announce };

    print!("Fetching the payload...");
    println!(" {:?}", leecher.fetch(&seeder).await.map(|payload| payload.len()));

    seeder.alter_block(ALTERED_INDEX);

    print!("Fetching the payload again...");
    println!(" {:?}", leecher.fetch(&seeder).await.map(|payload| payload.len()));

    Ok(())
}
