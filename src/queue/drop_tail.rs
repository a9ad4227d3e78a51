//! DropTail（尾丢弃）队列
//!
//! 当队列已满时，直接丢弃新到达的 packet。

use std::collections::VecDeque;

use crate::wifi::Packet;

use super::PacketQueue;

#[derive(Debug)]
pub struct DropTailQueue {
    max_pkts: usize,
    cur_bytes: u64,
    q: VecDeque<Packet>,
}

impl DropTailQueue {
    pub fn new(max_pkts: usize) -> Self {
        Self {
            max_pkts,
            cur_bytes: 0,
            q: VecDeque::new(),
        }
    }
}

impl PacketQueue for DropTailQueue {
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        if self.q.len() >= self.max_pkts {
            return Err(pkt);
        }
        self.cur_bytes = self.cur_bytes.saturating_add(pkt.size_bytes as u64);
        self.q.push_back(pkt);
        Ok(())
    }

    fn dequeue(&mut self) -> Option<Packet> {
        let pkt = self.q.pop_front()?;
        self.cur_bytes = self.cur_bytes.saturating_sub(pkt.size_bytes as u64);
        Some(pkt)
    }

    fn front(&self) -> Option<&Packet> {
        self.q.front()
    }

    fn len(&self) -> usize {
        self.q.len()
    }

    fn bytes(&self) -> u64 {
        self.cur_bytes
    }

    fn capacity_pkts(&self) -> usize {
        self.max_pkts
    }
}
