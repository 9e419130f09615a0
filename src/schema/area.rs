//! Descriptor area
//!
//! Manages the field descriptors stored between the header and the record
//! area. The area is append-only: removed or superseded descriptors keep
//! their bytes and only flip their status byte.

use tracing::debug;

use crate::error::{FlatError, Result};
use crate::storage::{DataFile, Header, Status, HEADER_SIZE};

use super::FieldDescriptor;

/// A live descriptor and where it sits in the data file
#[derive(Debug, Clone)]
struct Slot {
    /// Absolute file offset of the descriptor
    offset: u64,

    /// Bytes reserved for the descriptor (its `Offset` byte)
    size: u8,

    descriptor: FieldDescriptor,
}

/// In-memory cache of the live field descriptors, in field order
///
/// ## Invariants
/// - `Header::item_count` counts every slot in the chain, live or not
/// - Only `Status::Normal` descriptors are cached
/// - Mutations that change the record layout require `Header::size == 0`
#[derive(Debug, Default)]
pub struct DescriptorArea {
    slots: Vec<Slot>,
}

impl DescriptorArea {
    /// An area with no descriptors (freshly reset file)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Walk the descriptor chain and cache the live descriptors
    pub fn load(data: &mut DataFile, header: &Header) -> Result<Self> {
        let mut slots = Vec::with_capacity(header.item_count as usize);
        let mut offset = HEADER_SIZE as u64;
        let data_start = u64::from(header.data_start);

        for _ in 0..header.item_count {
            if offset >= data_start {
                return Err(FlatError::Corruption(format!(
                    "descriptor chain passes data start {} at offset {}",
                    data_start, offset
                )));
            }

            let mut size = [0u8; 1];
            data.read_at(offset, &mut size)?;
            let size = size[0];
            if size == 0 {
                return Err(FlatError::Corruption(format!(
                    "zero-sized descriptor at offset {}",
                    offset
                )));
            }

            let mut buf = vec![0u8; size as usize];
            data.read_at(offset, &mut buf)?;
            let (_, descriptor) = FieldDescriptor::decode(&mut buf.as_slice())?;

            if descriptor.status == Status::Normal {
                slots.push(Slot {
                    offset,
                    size,
                    descriptor,
                });
            }
            offset += u64::from(size);
        }

        if offset != data_start {
            return Err(FlatError::Corruption(format!(
                "descriptor chain ends at {} but data starts at {}",
                offset, data_start
            )));
        }

        slots.sort_by_key(|slot| slot.descriptor.order);
        Ok(Self { slots })
    }

    /// Number of live fields
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Cached descriptor at field position `index`
    pub fn get(&self, index: usize) -> Result<&FieldDescriptor> {
        self.slots
            .get(index)
            .map(|slot| &slot.descriptor)
            .ok_or_else(|| FlatError::out_of_range(index, self.slots.len()))
    }

    /// Live descriptors in field order
    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        self.slots.iter().map(|slot| slot.descriptor.clone()).collect()
    }

    /// Position of the first live field called `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.descriptor.name == name)
    }

    /// Append a descriptor at `data_start`, growing the descriptor area
    pub fn append(
        &mut self,
        data: &mut DataFile,
        header: &mut Header,
        mut descriptor: FieldDescriptor,
    ) -> Result<()> {
        Self::ensure_no_records(header, "add field")?;
        descriptor.validate()?;

        descriptor.status = Status::Normal;
        descriptor.order = header.item_count;
        let slot = Self::write_new_slot(data, header, descriptor)?;

        debug!(
            name = %slot.descriptor.name,
            order = slot.descriptor.order,
            data_start = header.data_start,
            "field added"
        );
        self.slots.push(slot);
        Ok(())
    }

    /// Mark the descriptor at `index` deleted and drop it from the cache
    pub fn remove(
        &mut self,
        data: &mut DataFile,
        header: &Header,
        index: usize,
    ) -> Result<FieldDescriptor> {
        Self::ensure_no_records(header, "remove field")?;
        if index >= self.slots.len() {
            return Err(FlatError::out_of_range(index, self.slots.len()));
        }

        let slot = self.slots.remove(index);
        Self::write_status(data, &slot, Status::Deleted)?;

        debug!(name = %slot.descriptor.name, index, "field removed");
        Ok(slot.descriptor)
    }

    /// Replace the descriptor at `index`
    ///
    /// Rewrites in place when the new encoding fits the old slot. A larger
    /// encoding supersedes the old slot and appends a new one, which is only
    /// possible while the table holds no records.
    pub fn set(
        &mut self,
        data: &mut DataFile,
        header: &mut Header,
        index: usize,
        mut descriptor: FieldDescriptor,
    ) -> Result<()> {
        descriptor.validate()?;
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or_else(|| FlatError::out_of_range(index, len))?;

        descriptor.status = Status::Normal;
        descriptor.order = slot.descriptor.order;

        if descriptor.encoded_size() <= slot.size as usize {
            if header.size > 0 && !descriptor.same_layout(&slot.descriptor) {
                return Err(FlatError::InvalidOperation(
                    "cannot change field layout: records already written".to_string(),
                ));
            }

            let mut buf = Vec::with_capacity(slot.size as usize);
            descriptor.encode(slot.size, &mut buf);
            data.write_at(slot.offset, &buf)?;

            debug!(name = %descriptor.name, index, "field rewritten in place");
            slot.descriptor = descriptor;
            return Ok(());
        }

        Self::ensure_no_records(header, "grow field")?;
        let new_slot = Self::write_new_slot(data, header, descriptor)?;
        Self::write_status(data, slot, Status::Spare)?;

        debug!(
            name = %new_slot.descriptor.name,
            index,
            data_start = header.data_start,
            "field relocated"
        );
        *slot = new_slot;
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn ensure_no_records(header: &Header, action: &str) -> Result<()> {
        if header.size > 0 {
            return Err(FlatError::InvalidOperation(format!(
                "cannot {}: records already written",
                action
            )));
        }
        Ok(())
    }

    /// Write `descriptor` at `data_start` and advance the header past it
    fn write_new_slot(
        data: &mut DataFile,
        header: &mut Header,
        descriptor: FieldDescriptor,
    ) -> Result<Slot> {
        if header.item_count == u8::MAX {
            return Err(FlatError::out_of_range(
                u8::MAX as usize + 1,
                u8::MAX as usize,
            ));
        }

        // validate() bounds the encoded size to one byte
        let size = descriptor.encoded_size() as u8;
        let data_start = header
            .data_start
            .checked_add(u16::from(size))
            .ok_or_else(|| {
                FlatError::InvalidOperation("descriptor area full".to_string())
            })?;

        let offset = u64::from(header.data_start);
        let mut buf = Vec::with_capacity(size as usize);
        descriptor.encode(size, &mut buf);
        data.write_at(offset, &buf)?;

        header.data_start = data_start;
        header.item_count += 1;
        data.write_header(header)?;

        Ok(Slot {
            offset,
            size,
            descriptor,
        })
    }

    /// Flip the status byte of a slot (second byte of the descriptor)
    fn write_status(data: &mut DataFile, slot: &Slot, status: Status) -> Result<()> {
        data.write_at(slot.offset + 1, &[status as u8])
    }
}
