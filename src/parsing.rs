use nom::{
    bytes::complete::take_while1,
    character::complete::{char, i32, i64, space0, space1, u32},
    multi::separated_list0,
    number::complete::double,
    sequence::{delimited, preceded},
    IResult,
};

pub(crate) fn double_entry(line: &str) -> IResult<&str, f64> {
    preceded(space1, double)(line)
}

pub(crate) fn any_entry(line: &str) -> IResult<&str, &str> {
    preceded(space1, non_space)(line)
}

pub(crate) fn u32_entry(line: &str) -> IResult<&str, u32> {
    preceded(space1, u32)(line)
}

pub(crate) fn i32_entry(line: &str) -> IResult<&str, i32> {
    preceded(space1, i32)(line)
}

pub(crate) fn i64_entry(line: &str) -> IResult<&str, i64> {
    preceded(space1, i64)(line)
}

pub(crate) fn non_space(line: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_ascii_whitespace())(line)
}

/// A list of integers of the form `[1,2,3]`
pub(crate) fn i32_list_entry(line: &str) -> IResult<&str, Vec<i32>> {
    preceded(
        space1,
        delimited(
            char('['),
            separated_list0(char(','), preceded(space0, i32)),
            preceded(space0, char(']')),
        ),
    )(line)
}
