use std::time::Instant;

use crate::config::Config;


/// Direction of a block coder.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Mode {
    Compress,
    Decompress,
}

/// Tracks a block coder's totals and prints per block statistics
/// unless quiet.
#[derive(Copy, Clone, Debug)]
pub struct Progress {
    in_size:    u64,
    out_size:   u64,
    blks:       u64,
    evictions:  u64,
    time:       Instant,
    quiet:      bool,
    mode:       Mode,
}
impl Progress {
    /// Initialize counts and start a timer.
    pub fn new(cfg: &Config, mode: Mode) -> Progress {
        Progress {
            in_size:    0,
            out_size:   0,
            blks:       0,
            evictions:  0,
            time:       Instant::now(),
            quiet:      cfg.quiet,
            mode,
        }
    }

    /// Record one coded block and print current stats. Sizes are of the
    /// block's input and output; evictions is the running total.
    pub fn update(&mut self, in_size: usize, out_size: usize, evictions: u64) {
        self.blks += 1;
        self.in_size += in_size as u64;
        self.out_size += out_size as u64;
        self.evictions = evictions;
        self.print_block_stats(in_size, out_size);
    }

    fn print_block_stats(&self, in_size: usize, out_size: usize) {
        if !self.quiet {
            let verb = match self.mode {
                Mode::Compress   => "Compressed",
                Mode::Decompress => "Decompressed",
            };
            println!("{} block {} ({} bytes -> {} bytes) (Time elapsed: {:.2?})",
                verb, self.blks, in_size, out_size, self.time.elapsed());
        }
    }

    /// Print totals over every block so far.
    pub fn print_stats(&self) {
        if !self.quiet {
            println!("{} blocks, {} bytes -> {} bytes in {:.2?} ({} evictions)\n",
                self.blks, self.in_size, self.out_size, self.time.elapsed(), self.evictions);
        }
    }

    pub fn blocks(&self) -> u64 {
        self.blks
    }

    pub fn in_size(&self) -> u64 {
        self.in_size
    }

    pub fn out_size(&self) -> u64 {
        self.out_size
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }
}
