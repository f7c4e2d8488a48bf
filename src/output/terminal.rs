//! Terminal output for the command line front end.
//!
//! Everything here returns strings; printing is left to the caller.

use crate::models::{Address, Subnet};
use crate::processing::SubnetSet;
use colored::Colorize;

/// Widest IPv6 CIDR text, `ffff:...:ffff/128`.
const CIDR_WIDTH: usize = 43;
const ADDRESS_WIDTH: usize = 39;

/// Left-align `value` in a column of at least `width` characters.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    format!("{:<width$}", value.to_string())
}

fn paint(text: String, color: bool, style: fn(&str) -> colored::ColoredString) -> String {
    if color {
        style(&text).to_string()
    } else {
        text
    }
}

/// One row: CIDR, last address, number of addresses.
pub fn render_subnet_row(subnet: &Subnet, color: bool) -> String {
    let cidr = format_field(subnet, CIDR_WIDTH);
    format!(
        "{} {} {}",
        paint(cidr, color, |s| s.green()),
        format_field(subnet.last_address(), ADDRESS_WIDTH),
        subnet.size()
    )
}

/// Rows for a list of subnets followed by a count/size summary.
pub fn render_subnets<'a, I>(subnets: I, color: bool) -> Vec<String>
where
    I: IntoIterator<Item = &'a Subnet>,
{
    let subnets: Vec<&Subnet> = subnets.into_iter().collect();
    let mut rows: Vec<String> = subnets
        .iter()
        .map(|s| render_subnet_row(s, color))
        .collect();
    let total = crate::models::subnet::total_size(subnets.iter().copied());
    rows.push(format!("# {} subnet(s), {} address(es)", subnets.len(), total));
    rows
}

pub fn render_set(set: &SubnetSet, color: bool) -> Vec<String> {
    render_subnets(set, color)
}

/// Key/value description of one subnet.
pub fn render_info(subnet: &Subnet) -> Vec<String> {
    let mut rows = vec![
        format!("{} {}", format_field("cidr:", 10), subnet),
        format!("{} {}", format_field("family:", 10), subnet.family()),
        format!("{} {}", format_field("network:", 10), subnet.base_address()),
        format!("{} {}", format_field("last:", 10), subnet.last_address()),
        format!("{} {}", format_field("netmask:", 10), subnet.netmask()),
        format!("{} {}", format_field("wildcard:", 10), subnet.wildcard()),
        format!("{} {}", format_field("size:", 10), subnet.size()),
    ];
    if let Ok(v4) = subnet.base_address().mapped_ipv4() {
        rows.push(format!("{} {}", format_field("mapped:", 10), v4));
    }
    rows
}

pub fn render_bogon(address: &Address, bogon: bool, color: bool) -> String {
    let verdict = if bogon {
        paint("bogon".to_string(), color, |s| s.red())
    } else {
        paint("routable".to_string(), color, |s| s.green())
    };
    format!("{} {}", format_field(address, ADDRESS_WIDTH), verdict)
}
