use std::io::{self, BufReader, BufWriter, Read, Write};


/// Destination of coded bytes.
pub trait ByteSink {
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;
    fn flush_buffer(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Origin of coded bytes. Ok(None) signals the end of the data.
pub trait ByteSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

impl ByteSink for Vec<u8> {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.push(byte);
        Ok(())
    }
}

impl<W: Write> ByteSink for BufWriter<W> {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.write_all(&[byte])
    }
    fn flush_buffer(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl ByteSource for &[u8] {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        match self.split_first() {
            Some((&byte, rest)) => {
                *self = rest;
                Ok(Some(byte))
            }
            None => Ok(None),
        }
    }
}

impl<R: Read> ByteSource for BufReader<R> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}
