//! Label import and export files, used to link separately assembled modules.
//!
//! Import lines are `section label value`.  The export table lists every section as
//! `name start size flags` followed by every exported label as `name value`, all tab separated.

use super::expr::Evaluator;
use super::text::{chars,skip_spaces,label_word};
use super::{Context,Value,Error};

/// Hexadecimal with `0x` prefix, negative values get a leading minus
pub fn hex_string(v: Value) -> String {
    match v < 0 {
        true => format!("-{:#x}",v.unsigned_abs()),
        false => format!("{:#x}",v)
    }
}

/// Parse one import line, returns Ok(false) if the line does not hold a label
pub fn import_line(ctx: &mut Context,line: &str) -> Result<bool,Error> {
    let s = chars(line);
    let idx = skip_spaces(&s,0);
    let (section,idx) = label_word(&s,idx,&ctx.charsets,true);
    let idx = skip_spaces(&s,idx);
    let (label,idx) = label_word(&s,idx,&ctx.charsets,true);
    if label.is_empty() {
        return Ok(false);
    }
    let idx = skip_spaces(&s,idx);
    let mut ev = Evaluator::assembly(ctx);
    let (v,end) = ev.expression(&s,idx);
    if end == idx {
        return Ok(false);
    }
    if let Some(e) = ev.take_faults().into_iter().next() {
        return Err(e);
    }
    ctx.define_label(&label,v,&section)?;
    Ok(true)
}

/// Import all labels in `text`, problems are logged and the rest of the file is still read
pub fn import_labels(ctx: &mut Context,text: &str) -> usize {
    let mut count = 0;
    for (num,line) in text.lines().enumerate() {
        match import_line(ctx,line) {
            Ok(true) => count += 1,
            Ok(false) => log::debug!("import line {} skipped",num+1),
            Err(e) => log::error!("import line {}: {}",num+1,e)
        }
    }
    log::info!("imported {} labels",count);
    count
}

/// Build the export table, `elf` adds flags for the conventional section names
pub fn export_table(ctx: &Context,elf: bool) -> String {
    let mut ans = String::new();
    for (name,sec) in ctx.sections.iter() {
        let flag = match (elf,name.as_str()) {
            (true,".text") => "AX",
            (true,".data") => "WA",
            _ => ""
        };
        ans += &format!("{}\t{}\t{}\t{}\n",name,hex_string(sec.start),hex_string(sec.size),flag);
    }
    for (name,label) in ctx.exports.iter() {
        ans += &format!("{}\t{}\n",name,hex_string(label.value));
    }
    ans
}
