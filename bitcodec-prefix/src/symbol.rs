//! Symbol encodings and code tables.

use bitcodec_core::error::{BitCodecError, Result};
use bitcodec_core::{BitBuffer, Histogram};

/// One byte symbol and its prefix code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEncoding {
    /// The byte value.
    pub symbol: u8,
    /// Its code, first bit first.
    pub code: BitBuffer,
}

impl SymbolEncoding {
    /// Pair a symbol with a code.
    pub fn new(symbol: u8, code: BitBuffer) -> Self {
        Self { symbol, code }
    }
}

/// Mapping from byte symbols to prefix codes. Each symbol appears at most
/// once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<BitBuffer>>,
    len: usize,
}

impl Default for CodeTable {
    fn default() -> Self {
        Self {
            codes: vec![None; 256],
            len: 0,
        }
    }
}

impl CodeTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `code` to `symbol`. Fails if the symbol already has a code.
    pub fn insert(&mut self, symbol: u8, code: BitBuffer) -> Result<()> {
        let slot = &mut self.codes[symbol as usize];
        if slot.is_some() {
            return Err(BitCodecError::conflicting_code(symbol, code.to_string()));
        }
        *slot = Some(code);
        self.len += 1;
        Ok(())
    }

    /// Code of `symbol`, if it has one.
    #[inline]
    pub fn get(&self, symbol: u8) -> Option<&BitBuffer> {
        self.codes[symbol as usize].as_ref()
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no symbol has a code.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitBuffer)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(s, code)| code.as_ref().map(|c| (s as u8, c)))
    }

    /// Owned entries in ascending symbol order.
    pub fn to_encodings(&self) -> Vec<SymbolEncoding> {
        self.iter()
            .map(|(s, c)| SymbolEncoding::new(s, c.clone()))
            .collect()
    }

    /// Length of the longest code.
    pub fn max_code_len(&self) -> usize {
        self.iter().map(|(_, c)| c.len()).max().unwrap_or(0)
    }

    /// Payload bits needed to encode data with histogram `hist`.
    ///
    /// Fails with [`BitCodecError::InvalidValue`] if a counted symbol has no
    /// code.
    pub fn encoded_bits(&self, hist: &Histogram) -> Result<u64> {
        let mut total = 0u64;
        for (symbol, count) in hist.ordered() {
            let code = self.get(symbol).ok_or_else(|| {
                BitCodecError::invalid_value(format!("symbol {symbol:#04x} has no code"))
            })?;
            total += count * code.len() as u64;
        }
        Ok(total)
    }

    /// Average code length weighted by `hist`, in bits per symbol.
    pub fn average_code_len(&self, hist: &Histogram) -> Result<f64> {
        let total = hist.total();
        if total == 0 {
            return Ok(0.0);
        }
        Ok(self.encoded_bits(hist)? as f64 / total as f64)
    }
}

impl TryFrom<Vec<SymbolEncoding>> for CodeTable {
    type Error = BitCodecError;

    fn try_from(encodings: Vec<SymbolEncoding>) -> Result<Self> {
        let mut table = CodeTable::new();
        for entry in encodings {
            table.insert(entry.symbol, entry.code)?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> BitBuffer {
        s.parse().unwrap()
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = CodeTable::new();
        table.insert(b'a', bits("0")).unwrap();
        table.insert(b'b', bits("10")).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(b'b'), Some(&bits("10")));
        assert_eq!(table.get(b'c'), None);
        assert_eq!(table.max_code_len(), 2);
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let mut table = CodeTable::new();
        table.insert(7, bits("0")).unwrap();
        assert!(matches!(
            table.insert(7, bits("1")),
            Err(BitCodecError::ConflictingCode { symbol: 7, .. })
        ));
    }

    #[test]
    fn test_encoded_bits() {
        let table = CodeTable::try_from(vec![
            SymbolEncoding::new(b'a', bits("0")),
            SymbolEncoding::new(b'b', bits("10")),
            SymbolEncoding::new(b'c', bits("11")),
        ])
        .unwrap();
        let hist = Histogram::from_bytes(b"aaaabbc");
        assert_eq!(table.encoded_bits(&hist).unwrap(), 4 + 4 + 2);
        assert!((table.average_code_len(&hist).unwrap() - 10.0 / 7.0).abs() < 1e-12);

        let missing = Histogram::from_bytes(b"z");
        assert!(table.encoded_bits(&missing).is_err());
    }
}
