use winnow::binary::{be_u16, be_u32, be_u64, u8 as be_u8};
use winnow::prelude::*;
use winnow::token::take;

use crate::errors::DecodeError;

/// A thin big-endian reading cursor over the whole class file, built on the
/// same `winnow` combinators the archive reader uses for little-endian ZIP
/// structures. Every read maps a parse failure to `DecodeError::UnexpectedEof`
/// — the class-file format gives us no other way to distinguish "ran off the
/// end" from "malformed" at this layer.
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Cursor { data }
    }

    pub(crate) fn u8(&mut self) -> Result<u8, DecodeError> {
        be_u8.parse_next(&mut self.data).map_err(|_: winnow::error::ErrMode<winnow::error::ContextError>| DecodeError::UnexpectedEof)
    }

    pub(crate) fn u16(&mut self) -> Result<u16, DecodeError> {
        be_u16
            .parse_next(&mut self.data)
            .map_err(|_: winnow::error::ErrMode<winnow::error::ContextError>| DecodeError::UnexpectedEof)
    }

    pub(crate) fn u32(&mut self) -> Result<u32, DecodeError> {
        be_u32
            .parse_next(&mut self.data)
            .map_err(|_: winnow::error::ErrMode<winnow::error::ContextError>| DecodeError::UnexpectedEof)
    }

    pub(crate) fn u64(&mut self) -> Result<u64, DecodeError> {
        be_u64
            .parse_next(&mut self.data)
            .map_err(|_: winnow::error::ErrMode<winnow::error::ContextError>| DecodeError::UnexpectedEof)
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        take(len)
            .parse_next(&mut self.data)
            .map_err(|_: winnow::error::ErrMode<winnow::error::ContextError>| DecodeError::UnexpectedEof)
    }

    pub(crate) fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.take(len).map(|_| ())
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len()
    }
}
