use spotter_sd_rs::{
    ChannelKind, ErrorLog, OutputFormat, Result, VersionGroup, concatenate, concatenate_channel,
    index_channel_files,
};
use std::fs;
use std::path::Path;

const FLT_HEADER: &str = "millis,GPS_Epoch_Time(s),outx(mm),outy(mm),outz(mm)";

fn write(dir: &Path, name: &str, content: &str) -> Result<()> {
    fs::write(dir.join(name), content)?;
    Ok(())
}

fn concatenate_text(dir: &Path, channel: ChannelKind, output: &Path) -> Result<bool> {
    let mut errors = ErrorLog::new(dir.join("error.txt"));
    concatenate(
        dir,
        channel,
        &VersionGroup::implicit(),
        output,
        OutputFormat::Text,
        &mut errors,
    )
}

#[test]
fn files_are_joined_in_sequence_order() -> Result<()> {
    let card = tempfile::tempdir()?;
    let dir = card.path();
    write(dir, "10_FLT.CSV", &format!("{FLT_HEADER}\r\n3000,1600000003,3,3,3\r\n"))?;
    write(dir, "2_FLT.CSV", &format!("{FLT_HEADER}\r\n2000,1600000002,2,2,2\r\n"))?;
    write(
        dir,
        "1_FLT.CSV",
        &format!("{FLT_HEADER}\r\n1000,1600000001,1,1,1\r\n{FLT_HEADER}\r\n"),
    )?;
    write(dir, "1_SPC.CSV", "unrelated\n")?;
    write(dir, "notes.txt", "not a data file\n")?;

    let files = index_channel_files(dir, ChannelKind::Displacement, None)?;
    let order: Vec<u64> = files.iter().map(|f| f.sequence_number).collect();
    assert_eq!(order, vec![1, 2, 10]);

    let output = dir.join("displacement.csv");
    assert!(concatenate_text(dir, ChannelKind::Displacement, &output)?);

    let text = fs::read_to_string(&output)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            FLT_HEADER,
            "1000,1600000001,1,1,1",
            "2000,1600000002,2,2,2",
            "3000,1600000003,3,3,3",
        ]
    );
    assert!(!text.contains('\r'));
    assert!(!dir.join("error.txt").exists());
    Ok(())
}

#[test]
fn restricted_group_only_sees_its_files() -> Result<()> {
    let card = tempfile::tempdir()?;
    let dir = card.path();
    for seq in 1..=4 {
        write(dir, &format!("{seq:04}_FLT.CSV"), &format!("h\n{seq},0\n"))?;
    }

    let mut group = VersionGroup::implicit();
    group.file_numbers = Some([2, 3].into_iter().collect());

    let output = dir.join("out.csv");
    let mut errors = ErrorLog::new(dir.join("error.txt"));
    let stats = concatenate_channel(
        dir,
        ChannelKind::Displacement,
        &group,
        &output,
        OutputFormat::Text,
        &mut errors,
        false,
    )?
    .expect("files 2 and 3 are present");
    assert_eq!(stats.files_written, 2);
    assert_eq!(fs::read_to_string(&output)?, "h\n2,0\n3,0\n");
    Ok(())
}

#[test]
fn corrupt_file_is_logged_and_skipped() -> Result<()> {
    let card = tempfile::tempdir()?;
    let dir = card.path();
    write(dir, "0001_FLT.CSV", "h\n1,0\n")?;
    fs::write(dir.join("0002_FLT.CSV"), b"h\n\x00\xff\xfe garbage\n")?;
    write(dir, "0003_FLT.CSV", "h\n3,0\n")?;
    write(dir, "error.txt", "left over from an earlier run\n")?;

    let output = dir.join("displacement.csv");
    concatenate_text(dir, ChannelKind::Displacement, &output)?;

    assert_eq!(fs::read_to_string(&output)?, "h\n1,0\n3,0\n");
    let log = fs::read_to_string(dir.join("error.txt"))?;
    let expected = format!(
        "- ERROR:, file {} is corrupt\n",
        dir.join("0002_FLT.CSV").display()
    );
    assert_eq!(log, expected);
    Ok(())
}

#[test]
fn empty_files_contribute_nothing() -> Result<()> {
    let card = tempfile::tempdir()?;
    let dir = card.path();
    write(dir, "0001_LOC.CSV", "")?;
    write(dir, "0002_LOC.CSV", "lat,lon\n47.6,-122.3\n")?;

    let output = dir.join("location.csv");
    let mut errors = ErrorLog::new(dir.join("error.txt"));
    let stats = concatenate_channel(
        dir,
        ChannelKind::Location,
        &VersionGroup::implicit(),
        &output,
        OutputFormat::Text,
        &mut errors,
        false,
    )?
    .expect("location files exist");
    assert_eq!(stats.files_written, 1);
    assert_eq!(stats.files_skipped, 0);
    assert_eq!(fs::read_to_string(&output)?, "lat,lon\n47.6,-122.3\n");
    Ok(())
}

#[test]
fn location_includes_gps_files() -> Result<()> {
    let card = tempfile::tempdir()?;
    let dir = card.path();
    write(dir, "0001_LOC.CSV", "lat,lon\n1.0,2.0\n")?;
    write(dir, "0002_GPS.CSV", "lat,lon\n3.0,4.0\n")?;

    assert_eq!(index_channel_files(dir, ChannelKind::Location, None)?.len(), 2);
    assert_eq!(index_channel_files(dir, ChannelKind::Gps, None)?.len(), 1);

    let output = dir.join("location.csv");
    concatenate_text(dir, ChannelKind::Location, &output)?;
    assert_eq!(fs::read_to_string(&output)?, "lat,lon\n1.0,2.0\n3.0,4.0\n");
    Ok(())
}

#[test]
fn debug_spectra_keep_final_ensemble_records() -> Result<()> {
    let card = tempfile::tempdir()?;
    let dir = card.path();
    let body = [
        "type,a,b,c,n,s0,s1",
        "FFT,0,0,0,0,9,9",
        "SPECA,0,0,0,1,1.0,1.0",
        "SPECA,0,0,0,2,2.0,2.0",
        "SPECA,0,0,0,3,3.0,3.0",
        "SPECA,0,0,0,1,4.0,4.0",
        "SPECA_CC,0,0,0,7,5.0,5.0",
    ]
    .join("\n");
    write(dir, "0001_SPC.CSV", &body)?;

    let output = dir.join("spectra.csv");
    concatenate_text(dir, ChannelKind::Spectra, &output)?;

    assert_eq!(
        fs::read_to_string(&output)?,
        "type,a,b,c,n,s0,s1\nSPECA,0,0,0,3,3.0,3.0\nSPECA_CC,0,0,0,7,5.0,5.0\n"
    );
    Ok(())
}

#[test]
fn production_spectra_pass_every_record() -> Result<()> {
    let card = tempfile::tempdir()?;
    let dir = card.path();
    write(
        dir,
        "0001_SPC.CSV",
        "type,a,b,c,n\nSPEC_AVG,0,0,0,5\nSPEC_AVG,0,0,0,2\nnoise\n",
    )?;
    write(dir, "0002_SPC.CSV", "type,a,b,c,n\nSPEC_AVG,0,0,0,9\n")?;

    let output = dir.join("spectra.csv");
    concatenate_text(dir, ChannelKind::Spectra, &output)?;

    assert_eq!(
        fs::read_to_string(&output)?,
        "type,a,b,c,n\nSPEC_AVG,0,0,0,5\nSPEC_AVG,0,0,0,2\nSPEC_AVG,0,0,0,9\n"
    );
    Ok(())
}

#[test]
fn smart_mooring_is_sorted_per_file() -> Result<()> {
    let card = tempfile::tempdir()?;
    let dir = card.path();
    write(
        dir,
        "0001_SMD.CSV",
        "epoch,link,type,sensor,value\n\
         30,1,DATA,RBRDT,1\n\
         10,1,DATA,RBRDT,2\n\
         0,1,DATA,RBRDT,3\n\
         20,1,BSYS,boot,ok,with,commas\n\
         15,1\n",
    )?;

    let output = dir.join("smartmooring_data.csv");
    concatenate_text(dir, ChannelKind::SmartMooring, &output)?;

    assert_eq!(
        fs::read_to_string(&output)?,
        "epoch,link,type,sensor,value\n\
         10,1,DATA,RBRDT,2\n\
         20,1,BSYS,boot,ok,\"with,commas\"\n\
         30,1,DATA,RBRDT,1\n"
    );
    Ok(())
}

#[test]
fn system_logs_pass_through_untouched() -> Result<()> {
    let card = tempfile::tempdir()?;
    let dir = card.path();
    write(dir, "0001_SYS.log", "boot\r\nApp SHA: FE6412C3\r\nfree text, here\r\n")?;

    let output = dir.join("system.csv");
    concatenate_text(dir, ChannelKind::System, &output)?;

    assert_eq!(
        fs::read_to_string(&output)?,
        "boot\nApp SHA: FE6412C3\nfree text, here\n"
    );
    Ok(())
}

#[test]
fn location_prefers_its_own_file_over_gps() -> Result<()> {
    let card = tempfile::tempdir()?;
    let dir = card.path();
    write(dir, "0003_GPS.CSV", "lat,lon\n9.0,9.0\n")?;
    write(dir, "0003_LOC.CSV", "lat,lon\n3.0,4.0\n")?;

    let files = index_channel_files(dir, ChannelKind::Location, None)?;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name(), "0003_LOC.CSV");

    let output = dir.join("location.csv");
    concatenate_text(dir, ChannelKind::Location, &output)?;
    assert_eq!(fs::read_to_string(&output)?, "lat,lon\n3.0,4.0\n");
    Ok(())
}
