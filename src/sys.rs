use {
    lazy_regex::*,
    std::{
        fs::File,
        io::{self, Read},
        path::Path,
    },
};

/// read a system file into a string
pub fn read_file<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let mut file = File::open(path.as_ref())?;
    let mut buf = String::new();
    file.read_to_string(&mut buf)?;
    Ok(buf)
}

/// decode the ascii-octal escapes the kernel writes in mount
/// tables, for example `/media/dys/USB\040DISK` for
/// `/media/dys/USB DISK`
pub fn decode_string<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();
    if !s.contains('\\') {
        return s.to_string();
    }
    let mut bytes = Vec::with_capacity(s.len());
    let mut last = 0;
    for c in regex!(r"\\([0-7]{3})").captures_iter(s) {
        let (Some(whole), Some(digits)) = (c.get(0), c.get(1)) else {
            continue;
        };
        bytes.extend_from_slice(&s.as_bytes()[last..whole.start()]);
        match u8::from_str_radix(digits.as_str(), 8) {
            Ok(b) => bytes.push(b),
            Err(_) => bytes.extend_from_slice(whole.as_str().as_bytes()),
        }
        last = whole.end();
    }
    bytes.extend_from_slice(&s.as_bytes()[last..]);
    String::from_utf8_lossy(&bytes).to_string()
}

#[test]
fn test_decode_string() {
    assert_eq!(decode_string("/media/dys/USB\\040DISK"), "/media/dys/USB DISK");
    assert_eq!(decode_string("/plain/path"), "/plain/path");
    assert_eq!(decode_string("back\\134slash"), "back\\slash");
    assert_eq!(decode_string("/caf\\303\\251"), "/café");
    // 0o777 isn't a byte
    assert_eq!(decode_string("/odd\\777"), "/odd\\777");
}
