use super::error::FormatError;
use super::traits::PersistedFile;
use crate::core::models::equivalence::EquivalenceGroups;
use crate::core::models::ids::EntityId;
use itertools::Itertools;
use std::io::{BufRead, Write};
use std::marker::PhantomData;

/// Equivalence groups, one `[a, b, c]` line per group in representative order.
pub struct GroupsFile<T>(PhantomData<T>);

fn parse_group<T: EntityId>(line: &str, line_num: usize) -> Result<Vec<T>, FormatError> {
    let inner = line
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| FormatError::parse(line_num, "group must be enclosed in brackets"))?;
    if inner.trim().is_empty() {
        return Err(FormatError::parse(line_num, "group cannot be empty"));
    }
    inner
        .split(',')
        .map(|field| {
            field
                .trim()
                .parse::<u32>()
                .map(T::from)
                .map_err(|_| FormatError::parse(line_num, format!("invalid id '{}'", field.trim())))
        })
        .collect()
}

impl<T: EntityId> PersistedFile for GroupsFile<T> {
    type Content = EquivalenceGroups<T>;
    type Error = FormatError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Content, Self::Error> {
        let mut groups = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            if line.trim().is_empty() {
                continue;
            }
            groups.push(parse_group::<T>(&line, line_num + 1)?);
        }
        Ok(EquivalenceGroups::from_groups(groups)?)
    }

    fn write_to(content: &Self::Content, writer: &mut impl Write) -> Result<(), Self::Error> {
        for group in content.groups() {
            writeln!(writer, "[{}]", group.members().map(|id| id.raw()).join(", "))?;
        }
        Ok(())
    }
}
