use xxhash_rust::xxh3::Xxh3;

use crate::foundation::depth::SampleDepth;
use crate::foundation::format::{ColorFamily, VideoFormat};
use crate::graph::node::{Arg, Args, NodeId};

const XXH3_SEED: u64 = 0x6a09_e667_f3bc_c908;

/// Stable identity of a plugin call: same call on the same inputs gives the same fingerprint.
pub(crate) fn fingerprint_call(
    plugin: &str,
    function: &str,
    inputs: &[NodeId],
    args: &Args,
    format: &VideoFormat,
) -> u64 {
    let mut h = StableHasher::new();
    h.write_str(plugin);
    h.write_str(function);
    h.write_u32(inputs.len() as u32);
    for id in inputs {
        h.write_u32(id.0);
    }
    h.write_u32(args.0.len() as u32);
    for (k, v) in &args.0 {
        h.write_str(k);
        write_arg(&mut h, v);
    }
    write_format(&mut h, format);
    h.finish()
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> u64 {
        self.inner.digest()
    }
}

fn write_arg(h: &mut StableHasher, v: &Arg) {
    match v {
        Arg::Int(v) => {
            h.write_u8(0);
            h.write_u64(*v as u64);
        }
        Arg::Float(v) => {
            h.write_u8(1);
            h.write_f64(*v);
        }
        Arg::Bool(v) => {
            h.write_u8(2);
            h.write_u8(u8::from(*v));
        }
        Arg::Str(s) => {
            h.write_u8(3);
            h.write_str(s);
        }
        Arg::Ints(vs) => {
            h.write_u8(4);
            h.write_u32(vs.len() as u32);
            for v in vs {
                h.write_u64(*v as u64);
            }
        }
        Arg::Floats(vs) => {
            h.write_u8(5);
            h.write_u32(vs.len() as u32);
            for v in vs {
                h.write_f64(*v);
            }
        }
        Arg::Strs(vs) => {
            h.write_u8(6);
            h.write_u32(vs.len() as u32);
            for s in vs {
                h.write_str(s);
            }
        }
    }
}

fn write_format(h: &mut StableHasher, f: &VideoFormat) {
    h.write_u32(f.width);
    h.write_u32(f.height);
    match f.depth {
        SampleDepth::Integer(bits) => h.write_u8(bits),
        SampleDepth::Float => h.write_u8(32),
    }
    h.write_u8(match f.color_family {
        ColorFamily::Gray => 0,
        ColorFamily::Yuv => 1,
        ColorFamily::Rgb => 2,
    });
    h.write_u8(f.subsampling.w);
    h.write_u8(f.subsampling.h);
    h.write_u64(f.num_frames);
    h.write_u32(f.fps.num);
    h.write_u32(f.fps.den);
}
